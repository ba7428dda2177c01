//! Conditional caching middleware for Blockscript.
//!
//! [`ConditionalCacheMiddleware`] adds strong content-hash ETags to responses
//! that do not carry one and answers matching `If-None-Match` requests with
//! `304 Not Modified`.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use blockscript_http::{Handler, Middleware, MiddlewareChain, Request, Response, handler_fn};
//! use blockscript_middleware::ConditionalCacheMiddleware;
//!
//! # tokio_test::block_on(async {
//! let handler = Arc::new(handler_fn(|_request: Request| async {
//!     Ok(Response::ok().with_body("overlay"))
//! }));
//! let chain = MiddlewareChain::new(handler)
//!     .with_middleware(Arc::new(ConditionalCacheMiddleware::new()));
//!
//! let response = chain.handle(Request::get("/overlay")).await.unwrap();
//! assert!(response.headers.contains_key(hyper::header::ETAG));
//! # });
//! ```

pub mod conditional;
pub mod config;
mod drain;
pub mod error;
pub mod etag;

pub use blockscript_http::{Handler, Middleware, MiddlewareChain};

pub use conditional::{CacheOutcome, ConditionalCacheMiddleware};
pub use config::{ConditionalCacheConfig, DEFAULT_CACHE_CONTROL};
pub use error::{ConfigError, HashComputationError};
pub use etag::{Validator, ValidatorHasher, if_none_match_matches};
