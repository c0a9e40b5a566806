//! Authentication token generation and hashing.
//!
//! Plaintext tokens are handed to the client exactly once; only their SHA-256 hash is
//! persisted alongside the owning user and expiry.

pub mod record;
pub mod secret;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{UserId, token::secret::TokenSecret},
};

const TOKEN_ENTROPY_BYTES: usize = 16;

/// Purpose a token was minted for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
	/// Bearer token authenticating API requests.
	Authentication,
}
impl TokenScope {
	/// Returns a stable label suitable for storage or logging.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenScope::Authentication => "authentication",
		}
	}
}
impl Display for TokenScope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Base64url-encoded SHA-256 digest of a plaintext token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenHash(String);
impl TokenHash {
	/// Returns the encoded digest.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// Hashes a plaintext token the same way it is persisted.
pub fn hash_token(plaintext: &str) -> TokenHash {
	let digest = Sha256::digest(plaintext.as_bytes());

	TokenHash(URL_SAFE_NO_PAD.encode(digest))
}

/// Freshly minted token; the plaintext is only available on this value.
#[derive(Clone, Debug, Serialize)]
pub struct AuthToken {
	/// Plaintext bearer token returned to the client.
	#[serde(rename = "token")]
	pub plaintext: TokenSecret,
	/// Expiry instant.
	#[serde(rename = "expiry")]
	pub expires_at: OffsetDateTime,
	/// Owning user.
	#[serde(skip)]
	pub user_id: UserId,
	/// Digest persisted in place of the plaintext.
	#[serde(skip)]
	pub hash: TokenHash,
	/// Purpose of the token.
	#[serde(skip)]
	pub scope: TokenScope,
}
impl AuthToken {
	/// Generates a token for `user_id` that lasts for `ttl` from now.
	pub fn generate(user_id: UserId, ttl: Duration, scope: TokenScope) -> Result<Self> {
		Self::generate_at(user_id, OffsetDateTime::now_utc(), ttl, scope)
	}

	/// Generates a token as if minted at `issued_at`.
	///
	/// Fails when `issued_at + ttl` is not representable.
	pub fn generate_at(
		user_id: UserId,
		issued_at: OffsetDateTime,
		ttl: Duration,
		scope: TokenScope,
	) -> Result<Self> {
		let expires_at = issued_at.checked_add(ttl).ok_or(Error::ExpiryOutOfRange)?;
		let mut entropy = [0_u8; TOKEN_ENTROPY_BYTES];

		rand::rng().fill(&mut entropy);

		let plaintext = URL_SAFE_NO_PAD.encode(entropy);
		let hash = hash_token(&plaintext);

		Ok(Self { plaintext: TokenSecret::new(plaintext), expires_at, user_id, hash, scope })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn generated_tokens_hash_consistently() {
		let user = UserId::new(7).expect("User fixture should be valid.");
		let token = AuthToken::generate(user, Duration::hours(1), TokenScope::Authentication)
			.expect("Token generation should succeed.");

		assert_eq!(token.plaintext.expose().len(), 22);
		assert_eq!(token.hash, hash_token(token.plaintext.expose()));
		assert_ne!(token.hash.as_str(), token.plaintext.expose());

		let other = AuthToken::generate(user, Duration::hours(1), TokenScope::Authentication)
			.expect("Token generation should succeed.");

		assert_ne!(token.plaintext, other.plaintext);
	}

	#[test]
	fn serialized_token_exposes_only_token_and_expiry() {
		let user = UserId::new(7).expect("User fixture should be valid.");
		let issued = macros::datetime!(2025-11-10 12:00 UTC);
		let token =
			AuthToken::generate_at(user, issued, Duration::minutes(30), TokenScope::Authentication)
				.expect("Token generation should succeed.");
		let value = serde_json::to_value(&token).expect("Auth token should serialize.");
		let object = value.as_object().expect("Auth token should serialize as an object.");

		assert_eq!(object.len(), 2);
		assert_eq!(object["token"], token.plaintext.expose());
		assert!(object.contains_key("expiry"));
		assert_eq!(token.expires_at, macros::datetime!(2025-11-10 12:30 UTC));
	}

	#[test]
	fn unrepresentable_expiry_is_an_error() {
		let user = UserId::new(7).expect("User fixture should be valid.");
		let issued = macros::datetime!(2025-11-10 12:00 UTC);
		let ttl = Duration::minutes(i64::from(u32::MAX));

		assert!(matches!(
			AuthToken::generate_at(user, issued, ttl, TokenScope::Authentication),
			Err(Error::ExpiryOutOfRange)
		));
	}
}
