use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use db::models::{
    category::Category,
    todo::{CreateTodo, Todo},
};

use crate::api::{ApiClientError, TodoApi};

pub fn todo(id: i64, category: &str, completed: bool) -> Todo {
    Todo {
        id,
        text: format!("Task {id}"),
        category: category.to_string(),
        completed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetCategories,
    GetTodos(Option<String>),
    Create(String, String),
    Update(i64, bool),
    Delete(i64),
    Bulk(Vec<i64>, bool),
}

#[derive(Default)]
pub struct MockState {
    pub todos: Vec<Todo>,
    pub calls: Vec<Call>,
    pub fail_fetch: bool,
    pub fail_updates: bool,
    pub fail_deletes: bool,
    pub fail_bulk: bool,
    pub reject_create: Option<String>,
    pub commit_delay: Option<Duration>,
}

/// In-process stand-in for the server that records every call.
#[derive(Default)]
pub struct MockApi {
    pub state: Mutex<MockState>,
}

impl MockApi {
    pub fn with_todos(todos: Vec<Todo>) -> Arc<Self> {
        let api = Self::default();
        api.state.lock().unwrap().todos = todos;
        Arc::new(api)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than list fetches.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::GetCategories | Call::GetTodos(_)))
            .collect()
    }

    fn record(&self, call: Call) -> Option<Duration> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.commit_delay
    }
}

fn server_error() -> ApiClientError {
    ApiClientError::Http {
        status: 500,
        message: "Internal server error".to_string(),
    }
}

fn not_found() -> ApiClientError {
    ApiClientError::Http {
        status: 404,
        message: "Todo not found".to_string(),
    }
}

#[async_trait]
impl TodoApi for MockApi {
    async fn get_categories(&self) -> Result<Vec<Category>, ApiClientError> {
        self.record(Call::GetCategories);
        let state = self.state.lock().unwrap();
        if state.fail_fetch {
            return Err(ApiClientError::Transport("connection refused".to_string()));
        }
        Ok(["Work", "Personal", "Shopping", "Health"]
            .into_iter()
            .map(|name| Category {
                name: name.to_string(),
            })
            .collect())
    }

    async fn get_todos(&self, category: Option<&str>) -> Result<Vec<Todo>, ApiClientError> {
        self.record(Call::GetTodos(category.map(str::to_string)));
        let state = self.state.lock().unwrap();
        if state.fail_fetch {
            return Err(ApiClientError::Transport("connection refused".to_string()));
        }
        let mut todos: Vec<Todo> = state
            .todos
            .iter()
            .filter(|t| category.is_none_or(|c| t.category == c))
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(todos)
    }

    async fn create_todo(&self, data: &CreateTodo) -> Result<Todo, ApiClientError> {
        self.record(Call::Create(data.text.clone(), data.category.clone()));
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.reject_create.clone() {
            return Err(ApiClientError::Http {
                status: 400,
                message,
            });
        }
        let id = state.todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let created = Todo {
            id,
            text: data.text.clone(),
            category: data.category.clone(),
            completed: false,
        };
        state.todos.push(created.clone());
        Ok(created)
    }

    async fn update_todo(&self, id: i64, completed: bool) -> Result<Todo, ApiClientError> {
        if let Some(delay) = self.record(Call::Update(id, completed)) {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        if state.fail_updates {
            return Err(server_error());
        }
        let todo = state
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(not_found)?;
        todo.completed = completed;
        Ok(todo.clone())
    }

    async fn delete_todo(&self, id: i64) -> Result<(), ApiClientError> {
        if let Some(delay) = self.record(Call::Delete(id)) {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            return Err(server_error());
        }
        let before = state.todos.len();
        state.todos.retain(|t| t.id != id);
        if state.todos.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn bulk_update_todos(
        &self,
        ids: &[i64],
        completed: bool,
    ) -> Result<Vec<Todo>, ApiClientError> {
        self.record(Call::Bulk(ids.to_vec(), completed));
        let mut state = self.state.lock().unwrap();
        if state.fail_bulk {
            return Err(server_error());
        }
        let mut updated = Vec::new();
        for todo in state.todos.iter_mut().filter(|t| ids.contains(&t.id)) {
            todo.completed = completed;
            updated.push(todo.clone());
        }
        Ok(updated)
    }
}
