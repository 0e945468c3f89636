// Cache-aside counters
pub const CACHE_HITS_COUNTER: &str = "example_store_cache_hits_total";
pub const CACHE_MISSES_COUNTER: &str = "example_store_cache_misses_total";
pub const CACHE_ERRORS_COUNTER: &str = "example_store_cache_errors_total";

// HTTP
pub const HTTP_REQUESTS_COUNTER: &str = "http_requests_total";
pub const HTTP_REQUESTS_DURATION: &str = "http_requests_duration_seconds";
