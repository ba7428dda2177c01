//! HTTP request representation.

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Method, Uri, Version};

use crate::{Error, Result};

/// HTTP Request representation
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Request {
	/// Create a new request from its parts.
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
		}
	}

	/// Create a bodiless GET request for a static path.
	///
	/// # Examples
	///
	/// ```
	/// use blockscript_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::get("/overlay");
	/// assert_eq!(request.method, Method::GET);
	/// assert_eq!(request.uri.path(), "/overlay");
	/// ```
	pub fn get(path: &'static str) -> Self {
		Self::new(
			Method::GET,
			Uri::from_static(path),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::new(),
		)
	}

	/// Start building a request.
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Returns a header value as a string, if present and valid ASCII.
	pub fn header_str(&self, name: &HeaderName) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}
}

/// Builder for [`Request`]
///
/// # Examples
///
/// ```
/// use blockscript_http::Request;
/// use hyper::header::IF_NONE_MATCH;
///
/// let request = Request::builder()
///     .uri("/overlay")
///     .header(IF_NONE_MATCH, "\"abc\"")
///     .build()
///     .unwrap();
/// assert_eq!(request.header_str(&IF_NONE_MATCH), Some("\"abc\""));
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	uri: Option<String>,
	version: Version,
	headers: Vec<(HeaderName, String)>,
	body: Bytes,
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: None,
			version: Version::HTTP_11,
			headers: Vec::new(),
			body: Bytes::new(),
		}
	}
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Validates the URI and header values and builds the request.
	pub fn build(self) -> Result<Request> {
		let uri: Uri = self
			.uri
			.as_deref()
			.unwrap_or("/")
			.parse()
			.map_err(|e: hyper::http::uri::InvalidUri| Error::Http(e.to_string()))?;

		let mut headers = HeaderMap::with_capacity(self.headers.len());
		for (name, value) in self.headers {
			let value = HeaderValue::from_str(&value).map_err(|e| Error::Http(e.to_string()))?;
			headers.append(name, value);
		}

		Ok(Request::new(self.method, uri, self.version, headers, self.body))
	}
}
