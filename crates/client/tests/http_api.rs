use std::sync::Arc;

use client::{ApiClientError, CreateTodoError, HttpTodoApi, TodoApi, TodoPage};
use db::{DBService, models::todo::CreateTodo};
use server::{
    DeploymentImpl,
    config::{RunMode, ServerConfig},
    routes,
};
use tokio::net::TcpListener;

/// Serve a fresh in-memory backend on an ephemeral port and return its API
/// base URL.
async fn spawn_server(config: ServerConfig) -> String {
    let prefix = config.api_prefix().unwrap_or_default();
    let db = DBService::new_in_memory().await.unwrap();
    let app = routes::router(DeploymentImpl::from_parts(db, config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}{prefix}")
}

#[tokio::test]
async fn http_client_covers_every_endpoint() {
    let base = spawn_server(ServerConfig::default()).await;
    let api = HttpTodoApi::new(base).unwrap();

    let categories = api.get_categories().await.unwrap();
    assert_eq!(categories.len(), 4);
    assert_eq!(categories[0].name, "Work");

    let a = api.create_todo(&CreateTodo::new("Task A", "Work")).await.unwrap();
    let b = api.create_todo(&CreateTodo::new("Task B", "Health")).await.unwrap();
    assert!(!a.completed);

    let work = api.get_todos(Some("Work")).await.unwrap();
    assert_eq!(work, vec![a.clone()]);

    let updated = api.update_todo(a.id, true).await.unwrap();
    assert!(updated.completed);

    let bulk = api.bulk_update_todos(&[a.id, b.id], true).await.unwrap();
    assert_eq!(bulk.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b.id, a.id]);

    api.delete_todo(b.id).await.unwrap();
    let err = api.delete_todo(b.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.server_message(), Some("Todo not found"));

    let all = api.get_todos(None).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn quota_rejection_reaches_the_form() {
    let base = spawn_server(ServerConfig {
        mode: RunMode::Production,
        ..ServerConfig::default()
    })
    .await;
    assert!(base.ends_with("/api"));

    let api = Arc::new(HttpTodoApi::new(base).unwrap());
    let (mut page, _toasts) = TodoPage::new(api);
    page.load().await;
    assert!(page.banner().is_none());

    for i in 0..5 {
        page.create(&format!("Task {i}"), "Shopping").await.unwrap();
    }
    assert_eq!(page.todos().len(), 5);

    let err = page.create("One too many", "Shopping").await.unwrap_err();
    assert_eq!(
        err,
        CreateTodoError::Rejected("Category limit of 5 tasks reached.".to_string())
    );
    assert_eq!(page.todos().len(), 5);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpTodoApi::new(format!("http://{addr}")).unwrap();
    let err = api.get_categories().await.unwrap_err();
    assert!(matches!(err, ApiClientError::Transport(_)));
}
