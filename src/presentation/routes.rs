// Router - Route table for the clone workflow
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    apply_field, begin_edit, commit_edit, discard_edit, get_session, health_check, list_dashboards,
    list_datasets, open_session, submit_clone,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboards", get(list_dashboards))
        .route("/datasets", get(list_datasets))
        .route("/dashboards/:id/sessions", post(open_session))
        .route("/sessions/:id", get(get_session))
        .route(
            "/sessions/:id/charts/:uuid/edit",
            post(begin_edit).patch(apply_field).delete(discard_edit),
        )
        .route("/sessions/:id/charts/:uuid/commit", post(commit_edit))
        .route("/sessions/:id/clone", post(submit_clone))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
