use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::category::Category;
use services::services::todos::TodoService;

use crate::{DeploymentImpl, error::ApiError};

/// GET /categories
pub async fn get_categories(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<Category>>, ApiError> {
    let categories = TodoService::list_categories(&deployment.db().pool).await?;
    Ok(ResponseJson(categories))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/categories", get(get_categories))
}
