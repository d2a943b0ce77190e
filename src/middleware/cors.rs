use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue,
};
use http::{Method, StatusCode};

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

const ALLOW_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "content-type";

/// Cross-origin resource sharing.
///
/// Every response gets the allow-* headers. `OPTIONS` preflights are answered
/// with `204` here and never reach routing.
#[derive(Clone, Debug)]
pub struct Cors {
    origin: HeaderValue,
}

impl Cors {
    /// Allow a single origin, or `*` for any.
    pub fn new(origin: HeaderValue) -> Self {
        Self { origin }
    }

    fn decorate(&self, response: &mut Response) {
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    }
}

impl Default for Cors {
    fn default() -> Self {
        Self::new(HeaderValue::from_static("*"))
    }
}

impl Middleware for Cors {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let mut response = if *req.method() == Method::OPTIONS {
                Response::status(StatusCode::NO_CONTENT)
            } else {
                next.run(req).await
            };
            self.decorate(&mut response);
            response
        })
    }
}
