//! bcrypt password hashing and verification.

// self
use crate::_prelude::*;

/// bcrypt work factor applied to stored password hashes.
pub const PASSWORD_COST: u32 = 12;
/// bcrypt only reads the first 72 bytes of input; longer passwords are rejected.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Failures raised while hashing or checking a password.
#[derive(Debug, ThisError)]
pub enum PasswordError {
	/// Password is empty.
	#[error("Password must not be empty.")]
	Empty,
	/// Password exceeds what bcrypt can hash without truncation.
	#[error("Password must be at most 72 bytes long, got {len}.")]
	TooLong {
		/// Observed password length in bytes.
		len: usize,
	},
	/// Supplied password does not match the stored hash.
	#[error("Incorrect password.")]
	Mismatch,
	/// bcrypt rejected the cost or the stored hash.
	#[error(transparent)]
	Bcrypt(#[from] bcrypt::BcryptError),
}

/// Stored bcrypt hash in modular crypt format (`$2b$<cost>$...`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);
impl PasswordHash {
	/// Wraps a hash loaded from storage.
	pub fn new(stored: impl Into<String>) -> Self {
		Self(stored.into())
	}

	/// Hashes `password` with the provided bcrypt cost.
	pub fn generate(password: &str, cost: u32) -> Result<Self, PasswordError> {
		check_length(password)?;

		Ok(Self(bcrypt::hash(password, cost)?))
	}

	/// Returns the encoded hash for persistence.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Checks `password` against this hash.
	pub fn verify(&self, password: &str) -> Result<(), PasswordError> {
		check_length(password)?;

		if bcrypt::verify(password, &self.0)? { Ok(()) } else { Err(PasswordError::Mismatch) }
	}
}
impl Debug for PasswordHash {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("PasswordHash").field(&"<redacted>").finish()
	}
}

fn check_length(password: &str) -> Result<(), PasswordError> {
	match password.len() {
		0 => Err(PasswordError::Empty),
		len if len > MAX_PASSWORD_BYTES => Err(PasswordError::TooLong { len }),
		_ => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const FAST_COST: u32 = 4;

	#[test]
	fn hash_verifies_only_the_original_password() {
		let hash = PasswordHash::generate("correct horse", FAST_COST)
			.expect("Hashing a valid password should succeed.");

		assert!(hash.as_str().starts_with("$2b$04$"));
		assert!(hash.verify("correct horse").is_ok());
		assert!(matches!(hash.verify("wrong horse"), Err(PasswordError::Mismatch)));
		assert_eq!(format!("{hash:?}"), "PasswordHash(\"<redacted>\")");
	}

	#[test]
	fn default_cost_is_encoded_in_the_hash() {
		let hash = PasswordHash::generate("correct horse", PASSWORD_COST)
			.expect("Hashing at the default cost should succeed.");

		assert!(hash.as_str().starts_with("$2b$12$"));
	}

	#[test]
	fn invalid_inputs_are_typed_errors() {
		assert!(matches!(PasswordHash::generate("", FAST_COST), Err(PasswordError::Empty)));
		assert!(matches!(
			PasswordHash::generate(&"x".repeat(73), FAST_COST),
			Err(PasswordError::TooLong { len: 73 })
		));
		assert!(matches!(PasswordHash::generate("pw", 2), Err(PasswordError::Bcrypt(_))));
		assert!(matches!(
			PasswordHash::new("not-a-bcrypt-hash").verify("pw"),
			Err(PasswordError::Bcrypt(_))
		));
	}
}
