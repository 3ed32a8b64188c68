use axum::response::Json as ResponseJson;
use serde_json::{Value, json};

pub async fn health_check() -> ResponseJson<Value> {
    ResponseJson(json!({ "status": "ok" }))
}
