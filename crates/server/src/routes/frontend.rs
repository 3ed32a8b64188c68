//! Static hosting for the exported frontend build (production only).

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::DeploymentImpl;

/// Mount the asset directories and fall back to the exported index page for
/// every other path. Unknown API paths keep their JSON 404 because the API
/// router carries its own fallback.
pub fn serve(app: Router<DeploymentImpl>, frontend_path: &Path) -> Router<DeploymentImpl> {
    let index = frontend_path
        .join(".next")
        .join("server")
        .join("pages")
        .join("index.html");

    app.nest_service("/_next", ServeDir::new(frontend_path.join(".next")))
        .nest_service("/public", ServeDir::new(frontend_path.join("public")))
        .fallback_service(ServeFile::new(index))
}
