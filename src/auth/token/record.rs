//! Persisted token records and lifecycle helpers.

// self
use crate::{
	_prelude::*,
	auth::{
		Email, UserId,
		token::{AuthToken, TokenHash, TokenScope},
	},
};

/// Current lifecycle status for a token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is currently valid.
	Active,
	/// Token reached its expiry instant.
	Expired,
}

/// Stored view of an issued token. Never carries the plaintext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
	/// Owning user.
	pub user_id: UserId,
	/// Owning user's e-mail address.
	pub email: Email,
	/// SHA-256 digest of the plaintext token.
	pub token_hash: TokenHash,
	/// Purpose of the token.
	pub scope: TokenScope,
	/// Expiry instant.
	pub expires_at: OffsetDateTime,
	/// Instant the record was created.
	pub created_at: OffsetDateTime,
}
impl TokenRecord {
	/// Derives the persisted record for a freshly minted token.
	pub fn from_token(token: &AuthToken, email: Email, created_at: OffsetDateTime) -> Self {
		Self {
			user_id: token.user_id,
			email,
			token_hash: token.hash.clone(),
			scope: token.scope,
			expires_at: token.expires_at,
			created_at,
		}
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant >= self.expires_at {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Returns `true` if the record is still usable at the provided instant.
	pub fn is_active_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Active)
	}
}
