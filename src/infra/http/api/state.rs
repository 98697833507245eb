use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::application::auth::AuthService;
use crate::application::items::ItemService;
use crate::application::repos::HealthRepo;

/// `Cache-Control` policy of item and collection responses.
#[derive(Debug, Clone, Copy)]
pub struct HttpCachePolicy {
    pub max_age: Duration,
}

impl HttpCachePolicy {
    pub fn header_value(&self) -> String {
        format!("max-age={}", self.max_age.as_secs())
    }
}

/// Monotonic id source of the greeting endpoint.
#[derive(Debug, Default)]
pub struct GreetingCounter(AtomicU64);

impl GreetingCounter {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub items: Arc<ItemService>,
    pub auth: Arc<AuthService>,
    pub health: Arc<dyn HealthRepo>,
    pub http_cache: HttpCachePolicy,
    pub greetings: Arc<GreetingCounter>,
}
