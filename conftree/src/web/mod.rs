//! HTTP front end.
//!
//! Every request builds its own [`Tree`] from the shared schema, so handlers
//! never share mutable state. Generated documents go to a [`BlobStore`].
//!
//! | route | purpose |
//! |-------|---------|
//! | `GET /` | option form |
//! | `GET /api/v1/keys` | settable option paths |
//! | `POST /api/v1/configs` | render submitted values as `text/plain` |
//! | `GET /api/v1/configs/{id}` | fetch a stored document |
//! | `POST /go` | render, store and show the document |
//! | `GET /style.css` | bundled stylesheet |

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use indexmap::IndexMap;
use thiserror::Error;
use tower_http::services::ServeDir;

use crate::{
    data::{Schema, Tree},
    error::{Error, SchemaError},
    store::{BlobStore, StoreError},
};

/// HTML page templates.
pub mod pages;

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub schema: Arc<Schema>,
    pub store: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(schema: Schema, store: impl BlobStore + 'static) -> Self {
        Self {
            schema: Arc::new(schema),
            store: Arc::new(store),
        }
    }
}

/// Handler failures mapped to HTTP statuses.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Tree(#[from] Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no config stored under {0:?}")]
    NotFound(String),

    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<SchemaError> for ApiError {
    fn from(e: SchemaError) -> Self {
        ApiError::Tree(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Tree(Error::UnknownPath(_)) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{self}");
        } else {
            debug!("{self}");
        }
        (status, self.to_string()).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/go", post(go))
        .route("/api/v1/keys", get(keys))
        .route("/api/v1/configs", post(post_config))
        .route("/api/v1/configs/{id}", get(get_config))
        .route("/style.css", get(stylesheet));

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }
    app.with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    static_dir: Option<PathBuf>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state, static_dir)).await
}

/// Keep the first value of every key.
///
/// A checked box submits both `on` and its hidden `0` fallback, in that order.
fn first_values(pairs: Vec<(String, String)>) -> IndexMap<String, String> {
    let mut values = IndexMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        values.entry(key).or_insert(value);
    }
    values
}

fn generate(schema: &Schema, pairs: Vec<(String, String)>) -> Result<String, ApiError> {
    let mut tree = Tree::build(schema)?;
    Ok(tree.local_conf(first_values(pairs))?)
}

fn plain_text(text: String) -> Response {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response()
}

async fn stylesheet() -> Response {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        pages::STYLESHEET,
    )
        .into_response()
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let tree = Tree::build(&state.schema)?;
    Ok(Html(pages::form_page(&tree.render_form())))
}

async fn keys(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let tree = Tree::build(&state.schema)?;
    Ok(Json(tree.keys()))
}

async fn post_config(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    Ok(plain_text(generate(&state.schema, pairs)?))
}

async fn get_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.clone();
    let lookup = id.clone();
    match tokio::task::spawn_blocking(move || store.load(&lookup)).await?? {
        Some(text) => Ok(plain_text(text)),
        None => Err(ApiError::NotFound(id)),
    }
}

async fn go(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>, ApiError> {
    let local_conf = generate(&state.schema, pairs)?;

    let store = state.store.clone();
    let text = local_conf.clone();
    let id = tokio::task::spawn_blocking(move || store.save(&text)).await??;
    info!("Stored generated config as {id}");

    Ok(Html(pages::output_page(&local_conf, &id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::NodeSchema,
        store::MemoryStore,
    };
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use tower::ServiceExt;

    fn state() -> AppState {
        let schema = Schema::new(vec![
            NodeSchema::new("mysql", "boolean")
                .with_description("MySQL")
                .with_template("enable_service mysql"),
            NodeSchema::new("rabbitmq", "boolean").with_child(
                NodeSchema::new("password", "string")
                    .with_default("secret")
                    .with_template("RABBIT_PASSWORD={{ data[\"rabbitmq.password\"] }}")
                    .when_parent_is(true),
            ),
            NodeSchema::new("admin", "hidden").with_template("ADMIN_PASSWORD=admin"),
        ])
        .unwrap();
        AppState::new(schema, MemoryStore::new())
    }

    fn form_request(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_shows_form() {
        let app = router(state(), None);
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains(r#"<form method="post" action="/go">"#));
        assert!(body.contains(r#"name="rabbitmq.password""#));
        assert!(!body.contains("admin"));
    }

    #[tokio::test]
    async fn test_linked_stylesheet_is_served() {
        let app = router(state(), None);
        let page = body_string(
            app.clone()
                .oneshot(Request::get("/").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert!(page.contains(r#"<link rel="stylesheet" href="/style.css">"#));

        let response = app
            .oneshot(Request::get("/style.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert_eq!(body_string(response).await, pages::STYLESHEET);
        assert!(!pages::STYLESHEET.is_empty());
    }

    #[tokio::test]
    async fn test_keys() {
        let app = router(state(), None);
        let response = app
            .oneshot(Request::get("/api/v1/keys").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let keys: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(keys, vec!["mysql", "rabbitmq", "rabbitmq.password"]);
    }

    #[tokio::test]
    async fn test_post_config() {
        let app = router(state(), None);
        let response = app
            .oneshot(form_request(
                "/api/v1/configs",
                "mysql=0&rabbitmq=on&rabbitmq=0&rabbitmq.password=X",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            body_string(response).await,
            "[[local|localrc]]\nRABBIT_PASSWORD=X\nADMIN_PASSWORD=admin\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_key_is_bad_request() {
        let app = router(state(), None);
        let response = app
            .oneshot(form_request("/api/v1/configs", "nonexistent.path=v"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("nonexistent.path"));
    }

    #[tokio::test]
    async fn test_go_then_fetch() {
        let app = router(state(), None);
        let response = app
            .clone()
            .oneshot(form_request("/go", "rabbitmq.password=Y"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_string(response).await;
        assert!(page.contains("RABBIT_PASSWORD=Y"));

        let start = page.find("/api/v1/configs/").unwrap();
        let end = start + page[start..].find('"').unwrap();
        let link = &page[start..end];

        let response = app
            .oneshot(Request::get(link).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "[[local|localrc]]\n\n# MySQL\nenable_service mysql\nRABBIT_PASSWORD=Y\nADMIN_PASSWORD=admin\n"
        );
    }

    #[tokio::test]
    async fn test_missing_config_is_not_found() {
        let app = router(state(), None);
        let response = app
            .oneshot(
                Request::get("/api/v1/configs/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_first_value_wins() {
        let values = first_values(vec![
            ("a".into(), "on".into()),
            ("b".into(), "x".into()),
            ("a".into(), "0".into()),
        ]);
        assert_eq!(values.get("a").map(String::as_str), Some("on"));
        assert_eq!(values.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
