//! Todo operations with the validation and quota rules applied.

use db::models::{
    category::Category,
    todo::{BulkUpdateOutcome, CreateTodo, Todo},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use super::quota::{self, CATEGORY_TASK_LIMIT};

#[derive(Debug, Error)]
pub enum TodoServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Category limit of {limit} tasks reached.")]
    QuotaExceeded { category: String, limit: i64 },
    #[error("Todo not found")]
    NotFound(i64),
}

pub struct TodoService;

impl TodoService {
    pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>, TodoServiceError> {
        Ok(Category::find_all(pool).await?)
    }

    /// Newest first. An empty filter means every category.
    pub async fn list(
        pool: &SqlitePool,
        category: Option<&str>,
    ) -> Result<Vec<Todo>, TodoServiceError> {
        let category = category.filter(|c| !c.is_empty());
        Ok(Todo::find_all(pool, category).await?)
    }

    /// Validate, check the category quota, then insert.
    ///
    /// The incomplete count and the insert are separate statements, so two
    /// concurrent creators for the same category can both pass the check.
    pub async fn create(pool: &SqlitePool, data: &CreateTodo) -> Result<Todo, TodoServiceError> {
        if data.text.is_empty() || data.category.is_empty() {
            return Err(TodoServiceError::Validation(
                "Text and category are required".to_string(),
            ));
        }

        if !Category::exists(pool, &data.category).await? {
            return Err(TodoServiceError::Validation(format!(
                "Category '{}' does not exist",
                data.category
            )));
        }

        let incomplete = Todo::count_incomplete_in_category(pool, &data.category).await?;
        if !quota::may_create(incomplete) {
            debug!(
                category = %data.category,
                incomplete,
                "Rejecting todo: category quota reached"
            );
            return Err(TodoServiceError::QuotaExceeded {
                category: data.category.clone(),
                limit: CATEGORY_TASK_LIMIT,
            });
        }

        let todo = Todo::create(pool, data).await?;
        info!(todo_id = todo.id, category = %todo.category, "Todo created");
        Ok(todo)
    }

    /// Not subject to the quota, reopening a task is always allowed.
    pub async fn set_completed(
        pool: &SqlitePool,
        id: i64,
        completed: bool,
    ) -> Result<Todo, TodoServiceError> {
        if Todo::update_completion(pool, id, completed).await? == 0 {
            return Err(TodoServiceError::NotFound(id));
        }

        let todo = Todo::find_by_id(pool, id)
            .await?
            .ok_or(TodoServiceError::NotFound(id))?;
        info!(todo_id = id, completed, "Todo completion updated");
        Ok(todo)
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), TodoServiceError> {
        if Todo::delete(pool, id).await? == 0 {
            return Err(TodoServiceError::NotFound(id));
        }
        info!(todo_id = id, "Todo deleted");
        Ok(())
    }

    pub async fn bulk_set_completed(
        pool: &SqlitePool,
        ids: &[i64],
        completed: bool,
    ) -> Result<Vec<Todo>, TodoServiceError> {
        if ids.is_empty() {
            return Err(TodoServiceError::Validation(
                "ids must be a non-empty array".to_string(),
            ));
        }

        match Todo::bulk_update_completion(pool, ids, completed).await? {
            BulkUpdateOutcome::Updated(todos) => {
                info!(count = todos.len(), completed, "Todos bulk updated");
                Ok(todos)
            }
            BulkUpdateOutcome::Missing(id) => Err(TodoServiceError::NotFound(id)),
        }
    }
}
