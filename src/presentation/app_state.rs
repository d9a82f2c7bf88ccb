// Application state for HTTP handlers
use crate::application::clone_service::CloneService;
use crate::application::clone_session::SessionStore;
use crate::application::dashboard_service::DashboardService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub clone_service: CloneService,
    pub sessions: Arc<SessionStore>,
}
