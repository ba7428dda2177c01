//! Conditional GET Middleware
//!
//! Tags responses with a strong content-hash ETag and answers matching
//! `If-None-Match` requests with `304 Not Modified`.

use async_trait::async_trait;
use blockscript_http::{Handler, Middleware, Request, Response, Result};
use hyper::StatusCode;
use hyper::header::{CACHE_CONTROL, ETAG, HeaderValue, IF_NONE_MATCH};
use std::sync::Arc;

use crate::config::ConditionalCacheConfig;
use crate::drain::{DrainFailure, Drained, drain_and_hash};
use crate::error::{ConfigError, HashComputationError};
use crate::etag::if_none_match_matches;

/// Result of running a response through the middleware.
#[derive(Debug)]
pub enum CacheOutcome {
	/// The client's validator is current; 304 with an empty body
	NotModified(Response),
	/// Forwarded as produced
	PassThrough(Response),
	/// Forwarded with a freshly computed ETag and the cache policy
	Tagged(Response),
}

impl CacheOutcome {
	/// Returns the response to send.
	pub fn into_response(self) -> Response {
		match self {
			CacheOutcome::NotModified(response)
			| CacheOutcome::PassThrough(response)
			| CacheOutcome::Tagged(response) => response,
		}
	}

	/// Short name of the outcome, used in logs.
	pub fn name(&self) -> &'static str {
		match self {
			CacheOutcome::NotModified(_) => "not_modified",
			CacheOutcome::PassThrough(_) => "pass_through",
			CacheOutcome::Tagged(_) => "tagged",
		}
	}
}

/// Conditional cache middleware
///
/// - Keeps an `ETag` the handler already set and only answers conditionals against it.
/// - Forwards bodiless responses (absent body, 204, 304) untouched.
/// - Otherwise buffers the body once, hashes it with SHA-256 and tags the response.
///
/// No state is shared between requests: every response is hashed on its own.
pub struct ConditionalCacheMiddleware {
	cache_control: HeaderValue,
	max_buffer_bytes: Option<usize>,
}

impl ConditionalCacheMiddleware {
	/// Create the middleware with the default one-year, must-revalidate policy
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use blockscript_http::{Middleware, Request, Response, handler_fn};
	/// use blockscript_middleware::ConditionalCacheMiddleware;
	/// use hyper::header::{CACHE_CONTROL, ETAG};
	///
	/// # tokio_test::block_on(async {
	/// let middleware = ConditionalCacheMiddleware::new();
	/// let handler = Arc::new(handler_fn(|_request: Request| async {
	///     Ok(Response::ok().with_body("content"))
	/// }));
	///
	/// let response = middleware.process(Request::get("/"), handler).await.unwrap();
	/// assert!(response.headers.contains_key(ETAG));
	/// assert_eq!(
	///     response.headers.get(CACHE_CONTROL).unwrap(),
	///     "public, max-age=31536000, must-revalidate"
	/// );
	/// # });
	/// ```
	pub fn new() -> Self {
		Self {
			cache_control: HeaderValue::from_static(crate::config::DEFAULT_CACHE_CONTROL),
			max_buffer_bytes: None,
		}
	}

	/// Create the middleware from a configuration
	///
	/// # Errors
	///
	/// Returns [`ConfigError::InvalidCacheControl`] if the directive cannot be
	/// sent as a header value.
	pub fn with_config(config: ConditionalCacheConfig) -> std::result::Result<Self, ConfigError> {
		Ok(Self {
			cache_control: config.cache_control_header()?,
			max_buffer_bytes: config.max_buffer_bytes,
		})
	}

	/// Runs the cache state machine over a produced response.
	///
	/// `if_none_match` is the raw request header, if any.
	pub async fn evaluate(&self, if_none_match: Option<&str>, mut response: Response) -> CacheOutcome {
		if let Some(existing) = response.headers.get(ETAG).cloned() {
			let matched = match (if_none_match, existing.to_str()) {
				(Some(inm), Ok(tag)) => if_none_match_matches(inm, tag),
				_ => false,
			};
			if matched {
				return CacheOutcome::NotModified(self.not_modified(existing));
			}
			return CacheOutcome::PassThrough(response);
		}

		if response.body.is_absent()
			|| response.status == StatusCode::NO_CONTENT
			|| response.status == StatusCode::NOT_MODIFIED
		{
			return CacheOutcome::PassThrough(response);
		}

		let body = std::mem::take(&mut response.body);
		let Drained { bytes, validator } = match drain_and_hash(body, self.max_buffer_bytes).await {
			Ok(drained) => drained,
			Err(DrainFailure { error, body }) => {
				response.body = body;
				return self.degrade(response, error);
			}
		};

		let etag = match validator.to_header_value() {
			Ok(value) => value,
			Err(error) => {
				response.body = bytes.into();
				return self.degrade(response, error);
			}
		};

		if let Some(inm) = if_none_match
			&& if_none_match_matches(inm, validator.as_str())
		{
			return CacheOutcome::NotModified(self.not_modified(etag));
		}

		response.headers.insert(ETAG, etag);
		response
			.headers
			.insert(CACHE_CONTROL, self.cache_control.clone());
		response.body = bytes.into();
		CacheOutcome::Tagged(response)
	}

	fn not_modified(&self, etag: HeaderValue) -> Response {
		Response::not_modified()
			.with_typed_header(ETAG, etag)
			.with_typed_header(CACHE_CONTROL, self.cache_control.clone())
	}

	fn degrade(&self, response: Response, error: HashComputationError) -> CacheOutcome {
		tracing::warn!(
			error = %error,
			status = response.status.as_u16(),
			"serving response without validator"
		);
		CacheOutcome::PassThrough(response)
	}
}

impl Default for ConditionalCacheMiddleware {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Middleware for ConditionalCacheMiddleware {
	async fn process(&self, request: Request, handler: Arc<dyn Handler>) -> Result<Response> {
		let if_none_match = request
			.headers
			.get(IF_NONE_MATCH)
			.and_then(|v| v.to_str().ok())
			.map(str::to_owned);

		let response = handler.handle(request).await?;

		let outcome = self.evaluate(if_none_match.as_deref(), response).await;
		tracing::debug!(
			outcome = outcome.name(),
			etag = ?outcome_etag(&outcome),
			"conditional cache evaluated"
		);
		Ok(outcome.into_response())
	}
}

fn outcome_etag(outcome: &CacheOutcome) -> Option<&str> {
	let response = match outcome {
		CacheOutcome::NotModified(response)
		| CacheOutcome::PassThrough(response)
		| CacheOutcome::Tagged(response) => response,
	};
	response.headers.get(ETAG).and_then(|v| v.to_str().ok())
}
