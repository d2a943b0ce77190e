use std::time::Instant;

use tracing::info;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// Request logger: one event when a request arrives, one when it is answered.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = req.method().clone();
            let path = req.path().to_owned();
            let started = Instant::now();
            info!(%method, %path, "request");

            let response = next.run(req).await;

            info!(
                %method,
                %path,
                status = response.status_code().as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "response"
            );
            response
        })
    }
}
