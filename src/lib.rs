//! # todos
//!
//! A todo-list REST API on a small hyper-based framework.
//!
//! The framework half is generic: radix-tree routing via [`matchit`],
//! type-erased async handlers, a middleware chain, and a hyper server with
//! graceful shutdown. The [`todo`] module is the application: validation,
//! two interchangeable stores, and the route table.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use todos::middleware::Cors;
//! use todos::todo::{self, MemoryStore};
//! use todos::{Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), todos::Error> {
//!     let config = Config::from_env()?;
//!     let app = todo::app(Arc::new(MemoryStore::seeded()), Cors::new(config.cors_origin));
//!     Server::bind(config.addr).serve(app).await
//! }
//! ```
//!
//! Handlers are plain async functions from [`Request`] to anything
//! implementing [`IntoResponse`]:
//!
//! ```rust
//! use http::StatusCode;
//! use todos::{Request, Response, Router};
//!
//! async fn hello(req: Request) -> Response {
//!     match req.param("name") {
//!         Some(name) => Response::text(format!("hello, {name}")),
//!         None => Response::status(StatusCode::BAD_REQUEST),
//!     }
//! }
//!
//! let app = Router::new().get("/hello/{name}", hello);
//! ```

mod config;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;
pub mod todo;

pub use config::{Config, ConfigError, DEFAULT_PORT};
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{BoxError, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
