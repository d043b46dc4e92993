mod error;
mod generate;
mod health;
mod metrics;

pub use error::{HttpError, panic_response};
pub use generate::generate_handler;
pub use health::{health_handler, root_handler};
pub use metrics::metrics_handler;
