//! Symmetric key material shared by the link signer and the field cipher.

// self
use crate::{_prelude::*, error::ConfigError};

/// Redacted symmetric key keeping process secrets out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);
impl SigningKey {
	/// Wraps non-empty key material.
	pub fn new(value: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
		let bytes = value.as_ref();

		if bytes.is_empty() {
			return Err(ConfigError::EmptyKey);
		}

		Ok(Self(bytes.to_vec()))
	}

	/// Returns the raw key bytes. Callers must avoid logging them.
	pub fn expose(&self) -> &[u8] {
		&self.0
	}

	/// Key length in bytes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Always `false`; empty keys are rejected at construction.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningKey").field(&"<redacted>").finish()
	}
}
impl Display for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
