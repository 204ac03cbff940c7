//! Route table.

pub mod employees;
pub mod form;
pub mod health;
pub mod punches;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::state::AppState;

/// Build the router. `/health` and `/auth/login` are public; everything
/// else sits behind the bearer-token check.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/employees",
            post(employees::create_employee).get(employees::list_employees),
        )
        .route("/faces/enroll/:employee_id", post(employees::re_enroll))
        .route("/punches", post(punches::punch))
        .route("/punches/export.csv", get(punches::export_csv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.upload_limit))
        .with_state(state)
}
