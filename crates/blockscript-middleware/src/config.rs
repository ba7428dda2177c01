//! Configuration for [`ConditionalCacheMiddleware`](crate::ConditionalCacheMiddleware).

use hyper::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Cache for one year, but revalidate through the ETag once stale.
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000, must-revalidate";

/// Conditional cache configuration
///
/// # Examples
///
/// ```
/// use blockscript_middleware::ConditionalCacheConfig;
///
/// let config = ConditionalCacheConfig::from_toml_str(
///     r#"
///     cache_control = "public, max-age=60"
///     max_buffer_bytes = 1048576
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.cache_control, "public, max-age=60");
/// assert_eq!(config.max_buffer_bytes, Some(1024 * 1024));
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalCacheConfig {
	/// Value of the `Cache-Control` header on tagged and 304 responses
	pub cache_control: String,
	/// Largest body that will be buffered for hashing; `None` means no limit
	pub max_buffer_bytes: Option<usize>,
}

impl ConditionalCacheConfig {
	/// Create the default configuration
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the Cache-Control directive
	pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
		self.cache_control = cache_control.into();
		self
	}

	/// Limit how many body bytes are buffered for hashing
	pub fn with_max_buffer_bytes(mut self, limit: usize) -> Self {
		self.max_buffer_bytes = Some(limit);
		self
	}

	/// Parse a configuration from a TOML document; missing keys take defaults.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Check that the configuration can be turned into headers.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.cache_control_header().map(|_| ())
	}

	pub(crate) fn cache_control_header(&self) -> Result<HeaderValue, ConfigError> {
		HeaderValue::from_str(&self.cache_control)
			.map_err(|_| ConfigError::InvalidCacheControl(self.cache_control.clone()))
	}
}

impl Default for ConditionalCacheConfig {
	fn default() -> Self {
		Self {
			cache_control: DEFAULT_CACHE_CONTROL.to_string(),
			max_buffer_bytes: None,
		}
	}
}
