//! HTTP primitives for Blockscript.
//!
//! This crate provides the request/response types that flow through the
//! middleware pipeline, together with the [`Handler`] and [`Middleware`]
//! traits used to compose it.
//!
//! ## Example
//!
//! ```
//! use blockscript_http::{Handler, Request, Response, Result, handler_fn};
//!
//! # tokio_test::block_on(async {
//! let handler = handler_fn(|_request: Request| async { Ok(Response::ok().with_body("hello")) });
//! let response = handler.handle(Request::get("/")).await.unwrap();
//! assert_eq!(response.status, hyper::StatusCode::OK);
//! # });
//! ```

pub mod body;
pub mod error;
pub mod middleware;
pub mod request;
pub mod response;

pub use body::{Body, BoxError, StreamBody};
pub use error::{Error, Result};
pub use middleware::{FnHandler, Handler, Middleware, MiddlewareChain, handler_fn};
pub use request::{Request, RequestBuilder};
pub use response::Response;
