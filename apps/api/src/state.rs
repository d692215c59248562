use std::sync::Arc;

use crate::config::Config;
use crate::matching::service::MatchService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Match scoring over the profile and job repositories chosen at startup.
    pub matcher: Arc<MatchService>,
}
