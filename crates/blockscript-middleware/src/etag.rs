//! Strong content validators.
//!
//! A [`Validator`] is the quoted lowercase hex SHA-256 digest of a body. The
//! digest depends only on the bytes, so a body hashed chunk by chunk through
//! [`ValidatorHasher`] gets the same validator as the same body hashed at once.

use hyper::header::HeaderValue;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::HashComputationError;

/// Strong entity tag, including its surrounding double quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Validator(String);

impl Validator {
	/// Computes the validator of a complete body.
	///
	/// # Examples
	///
	/// ```
	/// use blockscript_middleware::Validator;
	///
	/// let validator = Validator::of(b"hello");
	/// assert_eq!(
	///     validator.as_str(),
	///     "\"2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824\""
	/// );
	/// ```
	pub fn of(body: &[u8]) -> Self {
		let mut hasher = ValidatorHasher::new();
		hasher.update(body);
		hasher.finish()
	}

	/// The quoted tag as sent in the `ETag` header.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Encodes the tag as a header value.
	pub fn to_header_value(&self) -> Result<HeaderValue, HashComputationError> {
		HeaderValue::from_str(&self.0).map_err(|e| HashComputationError::InvalidHeader(e.to_string()))
	}
}

impl fmt::Display for Validator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Incremental validator computation over body chunks.
#[derive(Clone, Default)]
pub struct ValidatorHasher {
	hasher: Sha256,
	len: usize,
}

impl fmt::Debug for ValidatorHasher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ValidatorHasher").field("len", &self.len).finish_non_exhaustive()
	}
}

impl ValidatorHasher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Feeds the next chunk of the body.
	pub fn update(&mut self, chunk: &[u8]) {
		self.hasher.update(chunk);
		self.len += chunk.len();
	}

	/// Number of bytes hashed so far.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn finish(self) -> Validator {
		Validator(format!("\"{}\"", hex::encode(self.hasher.finalize())))
	}
}

/// Checks an `If-None-Match` header value against a validator.
///
/// The header may list several tags separated by commas, or be `*`. Tags are
/// compared with the weak comparison function, so `W/"x"` matches `"x"`.
///
/// # Examples
///
/// ```
/// use blockscript_middleware::if_none_match_matches;
///
/// assert!(if_none_match_matches("\"abc\"", "\"abc\""));
/// assert!(if_none_match_matches("\"old\", W/\"abc\"", "\"abc\""));
/// assert!(if_none_match_matches("*", "\"abc\""));
/// assert!(!if_none_match_matches("\"xyz\"", "\"abc\""));
/// ```
pub fn if_none_match_matches(header: &str, validator: &str) -> bool {
	let validator = opaque_tag(validator.trim());
	header
		.split(',')
		.map(str::trim)
		.filter(|tag| !tag.is_empty())
		.any(|tag| tag == "*" || opaque_tag(tag) == validator)
}

fn opaque_tag(tag: &str) -> &str {
	tag.strip_prefix("W/").unwrap_or(tag)
}
