//! Middleware layer.
//!
//! Middleware wraps the router and is the place for cross-cutting concerns.
//! Layers run in registration order on the way in and in reverse order on the
//! way out; each decides whether to call [`Next::run`] at all.
//!
//! Built-in layers:
//! - [`Trace`] — one log event per request and per response
//! - [`Cors`] — cross-origin headers and preflight answers
//! - [`Recover`] — turns handler failures into a generic `500`
//!
//! [`Recover`] should be added last so it sits next to the handlers and sees
//! every failure before the outer layers see the response.

mod cors;
mod recover;
mod trace;

use std::sync::Arc;

pub use cors::Cors;
pub use recover::Recover;
pub use trace::Trace;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// A request interceptor.
///
/// ```rust
/// use todos::middleware::{Middleware, Next};
/// use todos::{BoxFuture, Request, Response};
///
/// struct PoweredBy;
///
/// impl Middleware for PoweredBy {
///     fn call<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
///         Box::pin(async move {
///             let mut response = next.run(req).await;
///             response.headers_mut().insert("x-powered-by", "todos".parse().unwrap());
///             response
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response>;
}

/// The rest of the chain, ending at the router's dispatch.
pub struct Next<'a> {
    layers: &'a [Arc<dyn Middleware>],
    router: &'a Router,
}

impl<'a> Next<'a> {
    pub(crate) fn new(layers: &'a [Arc<dyn Middleware>], router: &'a Router) -> Self {
        Self { layers, router }
    }

    /// Passes the request to the next layer, or to the router if none is left.
    pub async fn run(self, req: Request) -> Response {
        match self.layers.split_first() {
            Some((layer, rest)) => layer.call(req, Next::new(rest, self.router)).await,
            None => self.router.dispatch(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::header::HeaderValue;
    use http_body_util::Full;

    use super::*;

    struct Tag(&'static str);

    impl Middleware for Tag {
        fn call<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                let mut response = next.run(req).await;
                response.headers_mut().append("x-order", HeaderValue::from_static(self.0));
                response
            })
        }
    }

    #[tokio::test]
    async fn layers_unwind_in_reverse_order() {
        let router = Router::new()
            .get("/", |_req: Request| async { "hi" })
            .layer(Tag("outer"))
            .layer(Tag("inner"));

        let req = http::Request::builder().uri("/").body(Full::<Bytes>::default()).unwrap();
        let response = router.handle(req).await;
        let order: Vec<_> = response.headers().get_all("x-order").iter().collect();
        assert_eq!(order, ["inner", "outer"]);
    }
}
