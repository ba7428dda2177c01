//! Middleware and handler traits for HTTP request processing.
//!
//! ## Handler
//!
//! ```rust
//! use blockscript_http::{Handler, Request, Response, Result};
//! use async_trait::async_trait;
//!
//! struct OverlayHandler;
//!
//! #[async_trait]
//! impl Handler for OverlayHandler {
//!     async fn handle(&self, _request: Request) -> Result<Response> {
//!         Ok(Response::ok().with_body("<div></div>"))
//!     }
//! }
//! ```
//!
//! ## Middleware
//!
//! Middleware wraps the next handler and may rewrite its response:
//!
//! ```rust
//! use blockscript_http::{Handler, Middleware, Request, Response, Result};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct PoweredBy;
//!
//! #[async_trait]
//! impl Middleware for PoweredBy {
//!     async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
//!         let response = next.handle(request).await?;
//!         Ok(response.with_header("x-powered-by", "blockscript"))
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Handler trait for processing requests.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed.
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing.
#[async_trait]
pub trait Middleware: Send + Sync {
	/// Processes a request through this middleware.
	///
	/// # Arguments
	///
	/// * `request` - The incoming HTTP request
	/// * `next` - The next handler in the chain to call
	///
	/// # Errors
	///
	/// Returns an error if the middleware or next handler fails.
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;

	/// Whether this middleware runs for the given request. Defaults to `true`.
	fn should_continue(&self, _request: &Request) -> bool {
		true
	}
}

/// Handler backed by an async closure. See [`handler_fn`].
pub struct FnHandler<F> {
	f: F,
}

/// Wraps an async closure as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
	F: Fn(Request) -> Fut + Send + Sync,
	Fut: Future<Output = Result<Response>> + Send,
{
	FnHandler { f }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
	F: Fn(Request) -> Fut + Send + Sync,
	Fut: Future<Output = Result<Response>> + Send,
{
	async fn handle(&self, request: Request) -> Result<Response> {
		(self.f)(request).await
	}
}

/// Middleware chain - composes multiple middleware into a single handler.
///
/// Middleware run in the order they were added; the first one added is the
/// outermost.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	/// Creates a new middleware chain around the given handler.
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	/// Adds a middleware to the chain using builder pattern.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut current_handler = self.handler.clone();

		for middleware in self
			.middlewares
			.iter()
			.rev()
			.filter(|mw| mw.should_continue(&request))
		{
			current_handler = Arc::new(ComposedHandler {
				middleware: middleware.clone(),
				next: current_handler,
			});
		}

		current_handler.handle(request).await
	}
}

struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;
	use rstest::rstest;

	struct Prefix(&'static str);

	#[async_trait]
	impl Middleware for Prefix {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let response = next.handle(request).await?;
			let body = response.body.into_bytes().await.map_err(|e| Error::Body(e.to_string()))?;
			let new_body = format!("{}{}", self.0, String::from_utf8_lossy(&body));
			Ok(Response::ok().with_body(new_body))
		}
	}

	struct SkipAll;

	#[async_trait]
	impl Middleware for SkipAll {
		async fn process(&self, _request: Request, _next: Arc<dyn Handler>) -> Result<Response> {
			Ok(Response::not_found())
		}

		fn should_continue(&self, _request: &Request) -> bool {
			false
		}
	}

	fn body_handler() -> Arc<dyn Handler> {
		Arc::new(handler_fn(|_request: Request| async {
			Ok(Response::ok().with_body("body"))
		}))
	}

	#[rstest]
	#[tokio::test]
	async fn test_chain_order_outermost_first() {
		let chain = MiddlewareChain::new(body_handler())
			.with_middleware(Arc::new(Prefix("outer:")))
			.with_middleware(Arc::new(Prefix("inner:")));

		let response = chain.handle(Request::get("/")).await.unwrap();
		let body = response.body.into_bytes().await.unwrap();
		assert_eq!(&body[..], b"outer:inner:body");
	}

	#[rstest]
	#[tokio::test]
	async fn test_chain_without_middleware_calls_handler() {
		let chain = MiddlewareChain::new(body_handler());

		let response = chain.handle(Request::get("/")).await.unwrap();
		let body = response.body.into_bytes().await.unwrap();
		assert_eq!(&body[..], b"body");
	}

	#[rstest]
	#[tokio::test]
	async fn test_chain_skips_middleware_that_declines() {
		let chain = MiddlewareChain::new(body_handler()).with_middleware(Arc::new(SkipAll));

		let response = chain.handle(Request::get("/")).await.unwrap();
		assert_eq!(response.status, hyper::StatusCode::OK);
	}

	#[rstest]
	#[tokio::test]
	async fn test_handler_error_propagates() {
		let handler: Arc<dyn Handler> = Arc::new(handler_fn(|_request: Request| async {
			Err(Error::Handler("boom".to_string()))
		}));
		let chain = MiddlewareChain::new(handler).with_middleware(Arc::new(Prefix("x")));

		let err = chain.handle(Request::get("/")).await.unwrap_err();
		assert!(matches!(err, Error::Handler(msg) if msg == "boom"));
	}
}
