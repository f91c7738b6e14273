use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Customer, dashboard and scoring routes.
///
/// The unversioned paths are the ones the DataTables front end calls.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/customers", get(handlers::list_customers))
        .route("/api/v1/customers/:id", get(handlers::get_customer))
        .route("/api/v1/dashboard", get(handlers::dashboard))
        .route("/api/v1/score", post(handlers::score_record))
        .route("/clientes", get(handlers::list_customers))
        .route("/clientes/:id", get(handlers::get_customer))
        .route("/dashboard", get(handlers::dashboard))
}

/// Full application router without rate limiting.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes())
        .with_state(state)
}
