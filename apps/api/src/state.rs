use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::session::SessionController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one session. Handlers hold the lock for a whole action, so actions run
    /// one at a time and never overlap generation calls.
    pub session: Arc<Mutex<SessionController>>,
    pub config: Config,
}

impl AppState {
    pub fn new(controller: SessionController, config: Config) -> Self {
        Self {
            session: Arc::new(Mutex::new(controller)),
            config,
        }
    }
}
