use bytes::Bytes;
use futures::stream::Stream;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};

use crate::body::{Body, BoxError};

/// HTTP Response representation
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Body,
}

impl Response {
	/// Create a new Response with the given status code and no body
	///
	/// # Examples
	///
	/// ```
	/// use blockscript_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_absent());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Body::Empty,
		}
	}
	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}
	/// Create a Response with HTTP 204 No Content status
	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}
	/// Create a Response with HTTP 304 Not Modified status
	pub fn not_modified() -> Self {
		Self::new(StatusCode::NOT_MODIFIED)
	}
	/// Create a Response with HTTP 404 Not Found status
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}
	/// Set a fully buffered response body
	///
	/// # Examples
	///
	/// ```
	/// use blockscript_http::Response;
	/// use bytes::Bytes;
	///
	/// let response = Response::ok().with_body("Hello, World!");
	/// assert_eq!(response.body.as_bytes(), Some(&Bytes::from("Hello, World!")));
	/// ```
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Body::Full(body.into());
		self
	}
	/// Set a streaming response body
	pub fn with_stream<S>(mut self, stream: S) -> Self
	where
		S: Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
	{
		self.body = Body::from_stream(stream);
		self
	}
	/// Add a custom header to the response
	///
	/// Invalid names or values are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use blockscript_http::Response;
	///
	/// let response = Response::ok().with_header("X-Custom-Header", "custom-value");
	/// assert_eq!(
	///     response.headers.get("X-Custom-Header").unwrap().to_str().unwrap(),
	///     "custom-value"
	/// );
	/// ```
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}
	/// Add a custom header using typed HeaderName and HeaderValue
	pub fn with_typed_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}
	/// Canonical reason phrase for the status code
	///
	/// # Examples
	///
	/// ```
	/// use blockscript_http::Response;
	///
	/// assert_eq!(Response::not_modified().status_text(), "Not Modified");
	/// ```
	pub fn status_text(&self) -> &'static str {
		self.status.canonical_reason().unwrap_or("")
	}
}

impl Default for Response {
	fn default() -> Self {
		Self::ok()
	}
}
