//! Response body representation.
//!
//! A body is either absent, a fully buffered byte sequence, or a stream of
//! chunks that can be consumed exactly once.

use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;

/// Boxed error carried by body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for a streaming body
pub type StreamBody = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// HTTP message body
#[derive(Default)]
pub enum Body {
	/// No body at all
	#[default]
	Empty,
	/// Fully buffered bytes
	Full(Bytes),
	/// Chunked stream, readable once
	Stream(StreamBody),
}

impl Body {
	/// Wraps a stream of chunks.
	///
	/// # Examples
	///
	/// ```
	/// use blockscript_http::Body;
	/// use bytes::Bytes;
	///
	/// let chunks = vec![Ok(Bytes::from("a")), Ok(Bytes::from("b"))];
	/// let body = Body::from_stream(futures::stream::iter(chunks));
	/// assert!(body.is_stream());
	/// ```
	pub fn from_stream<S>(stream: S) -> Self
	where
		S: Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
	{
		Body::Stream(Box::pin(stream))
	}

	/// Returns true when there is no body.
	///
	/// A `Full` body holding zero bytes still counts as present: the producer
	/// chose to send an empty representation.
	pub fn is_absent(&self) -> bool {
		matches!(self, Body::Empty)
	}

	/// Returns true for streaming bodies.
	pub fn is_stream(&self) -> bool {
		matches!(self, Body::Stream(_))
	}

	/// Returns the buffered bytes if the body is already in memory.
	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			Body::Full(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// Consumes the body and collects it into a single buffer.
	///
	/// # Examples
	///
	/// ```
	/// use blockscript_http::Body;
	/// use bytes::Bytes;
	///
	/// # tokio_test::block_on(async {
	/// let chunks = vec![Ok(Bytes::from("ab")), Ok(Bytes::from("cd"))];
	/// let body = Body::from_stream(futures::stream::iter(chunks));
	/// assert_eq!(body.into_bytes().await.unwrap(), Bytes::from("abcd"));
	/// # });
	/// ```
	pub async fn into_bytes(self) -> Result<Bytes, BoxError> {
		match self {
			Body::Empty => Ok(Bytes::new()),
			Body::Full(bytes) => Ok(bytes),
			Body::Stream(mut stream) => {
				let mut buffer = BytesMut::new();
				while let Some(chunk) = stream.next().await {
					buffer.extend_from_slice(&chunk?);
				}
				Ok(buffer.freeze())
			}
		}
	}
}

impl fmt::Debug for Body {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Body::Empty => f.write_str("Body::Empty"),
			Body::Full(bytes) => f.debug_tuple("Body::Full").field(&bytes.len()).finish(),
			Body::Stream(_) => f.write_str("Body::Stream(..)"),
		}
	}
}

impl From<Bytes> for Body {
	fn from(bytes: Bytes) -> Self {
		Body::Full(bytes)
	}
}

impl From<Vec<u8>> for Body {
	fn from(bytes: Vec<u8>) -> Self {
		Body::Full(Bytes::from(bytes))
	}
}

impl From<&'static [u8]> for Body {
	fn from(bytes: &'static [u8]) -> Self {
		Body::Full(Bytes::from_static(bytes))
	}
}

impl From<&'static str> for Body {
	fn from(text: &'static str) -> Self {
		Body::Full(Bytes::from_static(text.as_bytes()))
	}
}

impl From<String> for Body {
	fn from(text: String) -> Self {
		Body::Full(Bytes::from(text))
	}
}
