//! Bearer-token issuance and lookup backed by a [`TokenStore`].
//!
//! Issuing a token replaces any token the user already holds, so each user has at most one
//! live token. Lookups hash the presented plaintext and match it against stored digests.

// self
use crate::{
	_prelude::*,
	auth::{AuthToken, Email, TokenRecord, TokenScope, UserId, hash_token},
	config::AuthConfig,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::TokenStore,
};

const KIND: FlowKind = FlowKind::Authentication;

/// Issues, authenticates, and revokes bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
	/// Token store implementation that persists token digests.
	pub store: Arc<dyn TokenStore>,
	/// Lifetime applied to newly issued tokens.
	pub ttl: Duration,
}
impl TokenIssuer {
	/// Creates an issuer over `store` minting tokens valid for `ttl`.
	pub fn new(store: Arc<dyn TokenStore>, ttl: Duration) -> Self {
		Self { store, ttl }
	}

	/// Creates an issuer using the configured token lifetime.
	pub fn from_config(store: Arc<dyn TokenStore>, config: &AuthConfig) -> Self {
		Self::new(store, config.auth_token_ttl)
	}

	/// Mints a token for the user and persists its digest, replacing older tokens.
	pub async fn issue(&self, user_id: UserId, email: Email) -> Result<AuthToken> {
		let span = FlowSpan::new(KIND, "issue_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let now = OffsetDateTime::now_utc();
				let token =
					AuthToken::generate_at(user_id, now, self.ttl, TokenScope::Authentication)?;

				self.store.replace_for_user(TokenRecord::from_token(&token, email, now)).await?;

				Ok::<_, Error>(token)
			})
			.await;

		Self::record(&result);

		result
	}

	/// Resolves a presented plaintext token to its owning record.
	pub async fn authenticate(&self, plaintext: &str) -> Result<TokenRecord> {
		self.authenticate_at(plaintext, OffsetDateTime::now_utc()).await
	}

	/// [`TokenIssuer::authenticate`] evaluated against a caller-supplied clock.
	pub async fn authenticate_at(
		&self,
		plaintext: &str,
		instant: OffsetDateTime,
	) -> Result<TokenRecord> {
		let span = FlowSpan::new(KIND, "authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let hash = hash_token(plaintext);
		let result = span
			.instrument(async {
				self.store.find_active(&hash, instant).await?.ok_or(Error::InvalidToken)
			})
			.await;

		Self::record(&result);

		result
	}

	/// Revokes every token held by the user, returning how many were removed.
	pub async fn revoke(&self, user_id: UserId) -> Result<usize> {
		let span = FlowSpan::new(KIND, "revoke");

		Ok(span.instrument(self.store.revoke_user(user_id)).await?)
	}

	/// Drops records that have expired by now.
	pub async fn purge_expired(&self) -> Result<usize> {
		let span = FlowSpan::new(KIND, "purge_expired");

		Ok(span.instrument(self.store.purge_expired(OffsetDateTime::now_utc())).await?)
	}

	fn record<T>(result: &Result<T>) {
		match result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish()
	}
}
