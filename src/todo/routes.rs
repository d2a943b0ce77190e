//! HTTP routes for the todo resource.
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `GET /` | 200 text | |
//! | `GET /todos[?completed=true\|false]` | 200 `[Todo]` | |
//! | `GET /todos/completed` | 200 `[Todo]` | |
//! | `GET /todos/active` | 200 `[Todo]` | |
//! | `GET /todos/{id}` | 200 `Todo` | 404 `{message}` |
//! | `POST /todos` | 201 `Todo` | 400 `{error}` |
//! | `PATCH /todos/{id}` | 200 `Todo` | 400 `{error}`, 404 `{message}` |
//! | `DELETE /todos/{id}` | 204 | 404 `{error}` |
//!
//! Validation and not-found outcomes are answered here. Store failures are
//! returned as `Err` and become a `500` in the recover middleware.
//!
//! `/todos/completed` and `/todos/active` are static routes, which the router
//! always prefers over `/todos/{id}`. For `PATCH` and `DELETE` there is no
//! static sibling, so those words reach `{id}`, fail to parse as an id, and
//! get the usual 404.

use std::future::Future;
use std::sync::Arc;

use http::StatusCode;
use serde_json::{Map, Value, json};

use super::model::{Todo, TodoId};
use super::store::{SharedStore, Store, StoreError};
use super::validate::{ValidationError, validate_new, validate_patch};
use crate::health;
use crate::middleware::{Cors, Recover, Trace};
use crate::request::Request;
use crate::response::{Json, Response};
use crate::router::Router;

pub const BANNER: &str = "Todo API is live! Visit /todos to see your todos.";

/// The full application: routes plus the middleware stack.
///
/// `Trace` is outermost so it logs the final status; `Recover` is innermost so
/// it sees every handler failure first.
pub fn app(store: SharedStore, cors: Cors) -> Router {
    router(store).layer(Trace).layer(cors).layer(Recover)
}

/// Route table without middleware.
pub fn router(store: SharedStore) -> Router {
    let probe = Arc::clone(&store);

    Router::new()
        .get("/", index)
        .get("/healthz", health::liveness)
        .get(
            "/readyz",
            health::readiness(move || {
                let store = Arc::clone(&probe);
                async move { store.ping().await }
            }),
        )
        .get("/todos", bind(&store, list))
        .get("/todos/completed", bind(&store, list_completed))
        .get("/todos/active", bind(&store, list_active))
        .get("/todos/{id}", bind(&store, show))
        .post("/todos", bind(&store, create))
        .patch("/todos/{id}", bind(&store, update))
        .delete("/todos/{id}", bind(&store, remove))
}

/// Adapts a `(Request, SharedStore)` handler to the router's `Fn(Request)`.
fn bind<F, Fut>(store: &SharedStore, handler: F) -> impl Fn(Request) -> Fut + Send + Sync + use<F, Fut>
where
    F: Fn(Request, SharedStore) -> Fut + Send + Sync + 'static,
    Fut: Future,
{
    let store = Arc::clone(store);
    move |req| handler(req, Arc::clone(&store))
}

async fn index(_req: Request) -> &'static str {
    BANNER
}

async fn list(req: Request, store: SharedStore) -> Result<Json<Vec<Todo>>, StoreError> {
    Ok(Json(store.list(completed_filter(&req)).await?))
}

async fn list_completed(_req: Request, store: SharedStore) -> Result<Json<Vec<Todo>>, StoreError> {
    Ok(Json(store.list(Some(true)).await?))
}

async fn list_active(_req: Request, store: SharedStore) -> Result<Json<Vec<Todo>>, StoreError> {
    Ok(Json(store.list(Some(false)).await?))
}

async fn show(req: Request, store: SharedStore) -> Result<Response, StoreError> {
    let found = match path_id(&req, &*store) {
        Some(id) => store.get(&id).await?,
        None => None,
    };
    Ok(match found {
        Some(todo) => Response::json(&todo),
        None => todo_not_found(),
    })
}

async fn create(req: Request, store: SharedStore) -> Result<Response, StoreError> {
    let new = match json_body(&req).and_then(|payload| validate_new(&payload).map_err(bad_request)) {
        Ok(new) => new,
        Err(response) => return Ok(response),
    };

    let todo = store.insert(new).await?;
    Ok(Response::builder().status(StatusCode::CREATED).json(&todo))
}

async fn update(req: Request, store: SharedStore) -> Result<Response, StoreError> {
    let patch = match json_body(&req).and_then(|payload| validate_patch(&payload).map_err(bad_request)) {
        Ok(patch) => patch,
        Err(response) => return Ok(response),
    };

    let updated = match path_id(&req, &*store) {
        Some(id) => store.update(&id, patch).await?,
        None => None,
    };
    Ok(match updated {
        Some(todo) => Response::json(&todo),
        None => todo_not_found(),
    })
}

async fn remove(req: Request, store: SharedStore) -> Result<Response, StoreError> {
    let removed = match path_id(&req, &*store) {
        Some(id) => store.delete(&id).await?,
        None => false,
    };
    Ok(if removed {
        Response::status(StatusCode::NO_CONTENT)
    } else {
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .json(&json!({ "error": "Not found" }))
    })
}

fn path_id(req: &Request, store: &dyn Store) -> Option<TodoId> {
    req.param("id").and_then(|raw| store.parse_id(raw))
}

/// `?completed=true|false`. Any other value, or the key given more than
/// once, means no filter.
fn completed_filter(req: &Request) -> Option<bool> {
    match req.query("completed").as_slice() {
        [value] if value == "true" => Some(true),
        [value] if value == "false" => Some(false),
        _ => None,
    }
}

/// The request body as JSON. An empty body reads as `{}`.
///
/// A body that does not parse is a client error: `400` with its own reason,
/// not the generic `500` that body-parser errors fell through to under the
/// Express error handler.
fn json_body(req: &Request) -> Result<Value, Response> {
    if req.body().iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    req.json().map_err(|_| {
        Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .json(&json!({ "error": "request body is not valid JSON" }))
    })
}

fn bad_request(err: ValidationError) -> Response {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .json(&json!({ "error": err.reason() }))
}

fn todo_not_found() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .json(&json!({ "message": "Todo not found" }))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn request(uri: &str, body: &'static [u8]) -> Request {
        let (parts, ()) = http::Request::builder().uri(uri).body(()).unwrap().into_parts();
        Request::new(parts, Bytes::from_static(body))
    }

    #[test]
    fn completed_filter_accepts_exact_booleans_only() {
        assert_eq!(completed_filter(&request("/todos?completed=true", b"")), Some(true));
        assert_eq!(completed_filter(&request("/todos?completed=false", b"")), Some(false));
        assert_eq!(completed_filter(&request("/todos", b"")), None);
        assert_eq!(completed_filter(&request("/todos?completed=1", b"")), None);
        assert_eq!(completed_filter(&request("/todos?completed=TRUE", b"")), None);
        assert_eq!(completed_filter(&request("/todos?completed=true&completed=false", b"")), None);
    }

    #[test]
    fn blank_body_reads_as_empty_object() {
        assert_eq!(json_body(&request("/todos", b"")).unwrap(), json!({}));
        assert_eq!(json_body(&request("/todos", b" \n")).unwrap(), json!({}));
    }

    #[test]
    fn malformed_body_is_a_400() {
        let response = json_body(&request("/todos", b"{task:")).unwrap_err();
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), br#"{"error":"request body is not valid JSON"}"#);
    }
}
