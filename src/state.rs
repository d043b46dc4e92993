use crate::service::CompletionService;

// app's shared state
pub struct AppState {
    pub service: CompletionService,
    pub default_model: Option<String>, // used when a request omits `model`
}

impl AppState {
    pub fn new(service: CompletionService, default_model: Option<String>) -> Self {
        Self {
            service,
            default_model,
        }
    }
}
