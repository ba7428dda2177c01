//! Error type shared by handlers and middleware.

/// Errors produced while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The handler failed to produce a response.
	#[error("Handler failed: {0}")]
	Handler(String),

	/// Reading a response or request body failed.
	#[error("Body error: {0}")]
	Body(String),

	/// Building a request or response failed.
	#[error("Invalid HTTP value: {0}")]
	Http(String),
}

impl From<hyper::http::Error> for Error {
	fn from(err: hyper::http::Error) -> Self {
		Error::Http(err.to_string())
	}
}

/// Result alias used throughout the HTTP layer.
pub type Result<T> = std::result::Result<T, Error>;
