use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{DeploymentImpl, error::ApiError};

pub mod categories;
pub mod frontend;
pub mod health;
pub mod todos;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api_routes = Router::new()
        .merge(categories::router(&deployment))
        .merge(todos::router(&deployment))
        .method_not_allowed_fallback(api_not_found)
        .fallback(api_not_found);

    let base = Router::new().route("/health", get(health::health_check));
    let app = match deployment.config().api_prefix() {
        Some(prefix) => base.nest(&prefix, api_routes),
        None => base.merge(api_routes),
    };

    let app = match deployment.config().frontend_dir() {
        Some(dir) => frontend::serve(app, dir),
        None => app,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}
