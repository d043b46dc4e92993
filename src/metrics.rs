use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("completion_requests_total", "Total number of generate requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("completion_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("completion_cache_misses_total", "Total cache misses").unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("completion_upstream_errors_total", "Total failed upstream calls").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "completion_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_WAIT: Histogram = register_histogram!(
        "completion_rate_limit_wait_seconds",
        "Time spent waiting on the upstream rate limiter"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("completion_cache_size", "Current number of items in cache").unwrap();
}

// Registration is lazy; force it so idle metrics still show up as zero
fn register_all() {
    lazy_static::initialize(&REQUEST_TOTAL);
    lazy_static::initialize(&CACHE_HITS);
    lazy_static::initialize(&CACHE_MISSES);
    lazy_static::initialize(&UPSTREAM_ERRORS);
    lazy_static::initialize(&REQUEST_LATENCY);
    lazy_static::initialize(&RATE_LIMIT_WAIT);
    lazy_static::initialize(&CACHE_SIZE);
}

// Prometheus text exposition of every registered metric
pub fn render() -> Result<String, prometheus::Error> {
    register_all();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
