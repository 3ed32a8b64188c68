use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, patch},
};
use db::models::todo::{BulkUpdateTodos, CreateTodo, Todo};
use serde::Deserialize;
use serde_json::Value;
use services::services::todos::TodoService;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct TodoQuery {
    pub category: Option<String>,
}

/// GET /todos?category=
pub async fn get_todos(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<TodoQuery>,
) -> Result<ResponseJson<Vec<Todo>>, ApiError> {
    let todos = TodoService::list(&deployment.db().pool, query.category.as_deref()).await?;
    Ok(ResponseJson(todos))
}

/// POST /todos
pub async fn create_todo(
    State(deployment): State<DeploymentImpl>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<Todo>), ApiError> {
    let Json(payload) = payload?;
    let todo = TodoService::create(&deployment.db().pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(todo)))
}

/// PATCH /todos/{id}
///
/// The body is read as raw JSON so that `"completed": "yes"` or `1` is
/// reported as a type error rather than silently coerced.
pub async fn update_todo(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ResponseJson<Todo>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let completed = payload
        .get("completed")
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::BadRequest("Completed field must be a boolean".to_string()))?;

    let todo = TodoService::set_completed(&deployment.db().pool, id, completed).await?;
    Ok(ResponseJson(todo))
}

/// DELETE /todos/{id}
pub async fn delete_todo(
    State(deployment): State<DeploymentImpl>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    TodoService::delete(&deployment.db().pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /todos/bulk
///
/// All-or-nothing: an unknown id fails the whole batch with 404.
pub async fn bulk_update_todos(
    State(deployment): State<DeploymentImpl>,
    payload: Result<Json<BulkUpdateTodos>, JsonRejection>,
) -> Result<ResponseJson<Vec<Todo>>, ApiError> {
    let Json(payload) = payload?;
    let todos =
        TodoService::bulk_set_completed(&deployment.db().pool, &payload.ids, payload.completed)
            .await?;
    Ok(ResponseJson(todos))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/todos", get(get_todos).post(create_todo))
        .route("/todos/bulk", patch(bulk_update_todos))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
}
