//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup via [`matchit`], which
//! always tries static segments before parameters: with both
//! `/todos/completed` and `/todos/{id}` registered, `/todos/completed`
//! reaches the static route no matter which was registered first.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use matchit::Router as MatchitRouter;
use tracing::warn;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup, then hand it to [`Server::serve`](crate::Server::serve)
/// or drive it directly with [`Router::handle`]. Builder methods return `self`
/// so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics on an invalid or duplicate route. Routes are fixed at startup,
    /// so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Append a middleware. The first layer added is the outermost: it sees
    /// the request first and the response last.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Runs one request through the middleware chain and the matched handler.
    ///
    /// The body is buffered in full before any middleware runs.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body,
        B::Error: fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(method = %parts.method, path = parts.uri.path(), "failed to read request body: {e}");
                return Response::status(StatusCode::BAD_REQUEST).into_inner();
            }
        };

        let next = Next::new(&self.layers, self);
        next.run(Request::new(parts, body)).await.into_inner()
    }

    /// Innermost step of the chain: route lookup and handler call.
    ///
    /// Unmatched paths and methods get an empty `404`.
    pub(crate) async fn dispatch(&self, mut req: Request) -> Response {
        let matched = self.routes.get(req.method()).and_then(|tree| {
            let found = tree.at(req.path()).ok()?;
            let params: HashMap<String, String> = found.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            Some((Arc::clone(found.value), params))
        });

        match matched {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder().uri(uri).body(Full::default()).unwrap()
    }

    async fn body_text(response: http::Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn by_id(req: Request) -> String {
        format!("id={}", req.param("id").unwrap_or_default())
    }

    async fn completed(_req: Request) -> &'static str {
        "completed"
    }

    #[tokio::test]
    async fn static_segment_wins_over_parameter() {
        // Parameter route registered first on purpose.
        let router = Router::new()
            .get("/todos/{id}", by_id)
            .get("/todos/completed", completed);

        assert_eq!(body_text(router.handle(get("/todos/completed")).await).await, "completed");
        assert_eq!(body_text(router.handle(get("/todos/7")).await).await, "id=7");
    }

    #[tokio::test]
    async fn unknown_path_and_method_are_404() {
        let router = Router::new().get("/todos/{id}", by_id);

        let missing = router.handle(get("/nope")).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let wrong_method = http::Request::builder()
            .method(Method::PUT)
            .uri("/todos/1")
            .body(Full::<Bytes>::default())
            .unwrap();
        assert_eq!(router.handle(wrong_method).await.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn duplicate_route_panics() {
        let _ = Router::new().get("/todos", completed).get("/todos", completed);
    }
}
