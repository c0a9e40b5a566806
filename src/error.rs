//! Crate-level error types shared across links, ciphers, stores, and flows.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Field encryption or decryption failure.
	#[error(transparent)]
	Crypto(#[from] crate::cipher::CryptoError),

	/// Signed link failed verification (MAC mismatch or malformed token).
	#[error("Invalid URL; tampering detected.")]
	InvalidSignature,
	/// Signed link is authentic but older than the accepted window.
	#[error("Link expired; it is older than {max_age_minutes} minutes.")]
	LinkExpired {
		/// Maximum accepted link age in minutes.
		max_age_minutes: u32,
	},
	/// Signed reset link does not carry an `email` query parameter.
	#[error("Reset link does not carry an email address.")]
	MissingEmail,
	/// Presented e-mail address failed validation.
	#[error(transparent)]
	InvalidEmail(#[from] crate::auth::IdentifierError),
	/// Token lifetime pushes its expiry past the representable range.
	#[error("Token expiry is out of range.")]
	ExpiryOutOfRange,
	/// Password hashing or verification failure.
	#[error(transparent)]
	Password(#[from] crate::auth::PasswordError),
	/// Authentication token is unknown, revoked, or expired.
	#[error("Authentication token is invalid or expired.")]
	InvalidToken,
}

/// Configuration and validation failures raised while wiring the crate.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is absent.
	#[error("Missing environment variable `{name}`.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable is present but cannot be parsed.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Parser-supplied reason string.
		reason: String,
	},
	/// Frontend address cannot be parsed or cannot carry a path.
	#[error("Frontend address is invalid.")]
	InvalidFrontend {
		/// Underlying parsing failure, absent when the URL parsed but cannot be a base.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Signing key material is empty.
	#[error("Signing key must not be empty.")]
	EmptyKey,
	/// Symmetric key cannot drive AES-GCM.
	#[error("Symmetric key must be 16, 24, or 32 bytes long, got {len}.")]
	InvalidKeyLength {
		/// Observed key length in bytes.
		len: usize,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("database unreachable"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn link_errors_render_caller_messages() {
		assert_eq!(Error::InvalidSignature.to_string(), "Invalid URL; tampering detected.");
		assert_eq!(
			Error::LinkExpired { max_age_minutes: 60 }.to_string(),
			"Link expired; it is older than 60 minutes."
		);
	}
}
