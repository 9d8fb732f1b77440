//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use taskman_auth::TokenService;
use taskman_core::{AuthService, TodoService};

/// Handle used to render the Prometheus exposition
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub todos: Arc<TodoService>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, todos: Arc<TodoService>, tokens: Arc<TokenService>) -> Self {
        Self {
            auth,
            todos,
            tokens,
        }
    }
}
