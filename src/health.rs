//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it serve traffic right now? |

use std::fmt::Display;
use std::future::Future;

use http::StatusCode;
use tracing::warn;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;

/// Liveness probe. Always `200 ok`; it has no dependencies on purpose.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Builds a readiness handler around `probe`.
///
/// `200 ready` when the probe succeeds, `503` (logged) when it fails.
pub fn readiness<P, Fut, E>(probe: P) -> impl Handler
where
    P: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    move |_req: Request| {
        let check = probe();
        async move {
            match check.await {
                Ok(()) => Response::text("ready"),
                Err(e) => {
                    warn!(error = %e, "readiness probe failed");
                    Response::status(StatusCode::SERVICE_UNAVAILABLE)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http_body_util::Full;

    use super::*;
    use crate::router::Router;

    fn get(uri: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder().uri(uri).body(Full::default()).unwrap()
    }

    #[tokio::test]
    async fn readiness_reflects_probe() {
        let router = Router::new()
            .get("/up", readiness(|| async { Ok::<(), String>(()) }))
            .get("/down", readiness(|| async { Err::<(), _>("database unreachable") }));

        assert_eq!(router.handle(get("/up")).await.status(), StatusCode::OK);
        assert_eq!(router.handle(get("/down")).await.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let router = Router::new().get("/healthz", liveness);
        assert_eq!(router.handle(get("/healthz")).await.status(), StatusCode::OK);
    }
}
