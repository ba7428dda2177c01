//! Error types for the caching middleware.
//!
//! None of these reach the request path: hashing failures degrade to an
//! untagged passthrough and configuration errors surface at construction.

/// Failure while buffering or hashing a response body.
#[derive(Debug, thiserror::Error)]
pub enum HashComputationError {
	/// The body stream yielded an error before it was fully drained
	#[error("failed to read response body: {0}")]
	Stream(String),

	/// The body grew past the configured buffer limit
	#[error("response body exceeds buffer limit of {limit} bytes")]
	TooLarge { limit: usize },

	/// The computed validator could not be encoded as a header value
	#[error("invalid validator header value: {0}")]
	InvalidHeader(String),
}

/// Invalid middleware configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The TOML document could not be parsed
	#[error("failed to parse configuration: {0}")]
	Parse(#[from] toml::de::Error),

	/// The Cache-Control directive is not a valid header value
	#[error("invalid Cache-Control value: {0:?}")]
	InvalidCacheControl(String),
}
