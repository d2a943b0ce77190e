use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use http::StatusCode;
use serde_json::json;
use tracing::error;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// Catches handler failures and panics.
///
/// The failure detail goes to the log; the client only ever sees
/// `500 {"error":"Server error!"}`, whatever went wrong.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recover;

impl Middleware for Recover {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = req.method().clone();
            let path = req.path().to_owned();

            let outcome = AssertUnwindSafe(async move { next.run(req).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(mut response) => {
                    let Some(failure) = response.take_failure() else {
                        return response;
                    };
                    error!(%method, %path, error = %failure, "request failed");
                }
                Err(panic) => {
                    error!(%method, %path, panic = panic_message(&*panic), "handler panicked");
                }
            }
            server_error()
        })
    }
}

fn server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .json(&json!({ "error": "Server error!" }))
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
