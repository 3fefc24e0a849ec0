use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
}

/// What `/echo` saw of the incoming request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

pub type Db = Arc<RwLock<HashMap<String, User>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/echo", any(echo))
        .route("/text", get(text))
        .route("/malformed", get(malformed))
        .route("/status/{code}", any(status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("mock server listening on {addr}");
    }
    axum::serve(listener, app()).await
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: input.name,
    };
    db.write().await.insert(user.id.clone(), user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<User>, StatusCode> {
    let users = db.read().await;
    users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let query = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers,
        body,
    })
}

async fn text() -> &'static str {
    "plain text, not json"
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"id": "1", "name": "#)
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}
