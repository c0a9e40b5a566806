//! Password-reset links: issue a signed link for an e-mail address, validate it when the
//! user follows it, carry the address through the reset form encrypted, and hash the new
//! password once the form comes back.
//!
//! Links are stateless. A link stays usable until it expires, however often it is opened.

// self
use crate::{
	_prelude::*,
	auth::{Email, PASSWORD_COST, PasswordHash},
	cipher::FieldCipher,
	config::AuthConfig,
	error::ConfigError,
	link::{LinkStatus, SignedLink, UrlSigner},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Path segment reset links point at.
pub const RESET_PATH: &str = "reset-password";
/// Query parameter carrying the e-mail address.
pub const EMAIL_PARAM: &str = "email";

const KIND: FlowKind = FlowKind::PasswordReset;

/// Signed reset link ready to embed in an outbound e-mail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResetLink {
	/// Fully signed URL.
	pub url: String,
	/// Issue instant embedded in the link.
	pub issued_at: OffsetDateTime,
}

/// Result of a successfully validated reset link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResetGrant {
	/// Address the link was issued for.
	#[serde(skip)]
	pub email: Email,
	/// Encrypted address to embed in the reset form.
	#[serde(rename = "email")]
	pub encrypted_email: String,
}

/// Issues and validates password-reset links.
#[derive(Clone, Debug)]
pub struct PasswordReset {
	signer: UrlSigner,
	cipher: FieldCipher,
	frontend_addr: Url,
	max_age_minutes: u32,
	password_cost: u32,
}
impl PasswordReset {
	/// Creates a flow rooted at `frontend_addr` accepting links up to `max_age_minutes` old.
	///
	/// `frontend_addr` must be able to carry a path.
	pub fn new(
		signer: UrlSigner,
		cipher: FieldCipher,
		frontend_addr: Url,
		max_age_minutes: u32,
	) -> Result<Self, ConfigError> {
		if frontend_addr.cannot_be_a_base() {
			return Err(ConfigError::InvalidFrontend { source: None });
		}

		Ok(Self { signer, cipher, frontend_addr, max_age_minutes, password_cost: PASSWORD_COST })
	}

	/// Overrides the bcrypt cost used by [`PasswordReset::complete`].
	pub fn with_password_cost(mut self, cost: u32) -> Self {
		self.password_cost = cost;

		self
	}

	/// Builds the flow from process configuration; one key both signs and encrypts.
	pub fn from_config(config: &AuthConfig) -> Result<Self> {
		let signer = UrlSigner::new(config.token_symmetric_key.clone())?;
		let cipher = FieldCipher::new(config.token_symmetric_key.expose())?;

		Ok(Self::new(
			signer,
			cipher,
			config.frontend_addr.clone(),
			config.reset_link_max_age_minutes,
		)?)
	}

	/// Maximum accepted link age in minutes.
	pub fn max_age_minutes(&self) -> u32 {
		self.max_age_minutes
	}

	/// Issues a reset link for `email` stamped with the current time.
	pub fn issue_link(&self, email: &Email) -> ResetLink {
		self.issue_link_at(email, OffsetDateTime::now_utc())
	}

	/// Issues a reset link for `email` stamped with `issued_at` truncated to whole seconds.
	pub fn issue_link_at(&self, email: &Email, issued_at: OffsetDateTime) -> ResetLink {
		let _guard = FlowSpan::new(KIND, "issue_link").entered();
		let issued_at = issued_at.replace_nanosecond(0).unwrap_or(issued_at);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let url = self.signer.sign_at(self.reset_url(email).as_str(), issued_at);

		obs::record_flow_outcome(KIND, FlowOutcome::Success);

		ResetLink { url, issued_at }
	}

	/// Validates a full inbound URL (scheme, host, path, and query).
	pub fn validate(&self, request_url: &str) -> Result<ResetGrant> {
		self.validate_at(request_url, OffsetDateTime::now_utc())
	}

	/// Validates a request URI (path and query) received by the frontend host.
	pub fn validate_request_uri(&self, request_uri: &str) -> Result<ResetGrant> {
		let origin = self.frontend_addr.origin().ascii_serialization();

		self.validate(&format!("{origin}{request_uri}"))
	}

	/// [`PasswordReset::validate`] evaluated against a caller-supplied clock.
	pub fn validate_at(&self, request_url: &str, now: OffsetDateTime) -> Result<ResetGrant> {
		let _guard = FlowSpan::new(KIND, "validate_link").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = self.grant(request_url, now);

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Decrypts the e-mail field posted back by the reset form.
	pub fn recover_email(&self, encrypted_email: &str) -> Result<Email> {
		let _guard = FlowSpan::new(KIND, "recover_email").entered();
		let plain = self.cipher.decrypt(encrypted_email)?;

		Ok(Email::new(plain)?)
	}

	/// Decrypts the posted e-mail and hashes the new password for storage.
	pub fn complete(
		&self,
		encrypted_email: &str,
		new_password: &str,
	) -> Result<(Email, PasswordHash)> {
		let _guard = FlowSpan::new(KIND, "complete_reset").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = self.recover_email(encrypted_email).and_then(|email| {
			let hash = PasswordHash::generate(new_password, self.password_cost)?;

			Ok((email, hash))
		});

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	fn grant(&self, request_url: &str, now: OffsetDateTime) -> Result<ResetGrant> {
		match self.signer.check_at(request_url, self.max_age_minutes, now) {
			LinkStatus::Fresh => {},
			status => {
				obs::warn_link_rejected(status);
				obs::record_link_rejection(status);

				return Err(match status {
					LinkStatus::Expired =>
						Error::LinkExpired { max_age_minutes: self.max_age_minutes },
					_ => Error::InvalidSignature,
				});
			},
		}

		let raw_email = SignedLink::parse(request_url)
			.and_then(|link| Url::parse(link.base_url()).ok())
			.and_then(|url| {
				url.query_pairs().find(|(k, _)| k == EMAIL_PARAM).map(|(_, v)| v.into_owned())
			})
			.ok_or(Error::MissingEmail)?;
		let email = Email::new(raw_email)?;
		let encrypted_email = self.cipher.encrypt(&email)?;

		Ok(ResetGrant { email, encrypted_email })
	}

	fn reset_url(&self, email: &Email) -> Url {
		let mut url = self.frontend_addr.clone();

		url.set_query(None);
		url.set_fragment(None);

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push(RESET_PATH);
		}

		url.query_pairs_mut().append_pair(EMAIL_PARAM, email);

		url
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::_preludet::*;

	fn email() -> Email {
		Email::new("jane@shop.example.com").expect("Email fixture should be valid.")
	}

	#[test]
	fn issued_links_point_at_reset_path() {
		let reset = test_password_reset(60);
		let link = reset.issue_link(&email());

		assert!(link.url.starts_with(
			"https://shop.example.com/reset-password?email=jane%40shop.example.com&hash="
		));
	}

	#[test]
	fn nested_frontend_paths_are_preserved() {
		let frontend = Url::parse("http://localhost:4000/shop/?stale=1#top")
			.expect("Frontend fixture should parse successfully.");
		let reset = PasswordReset::new(test_signer(), test_cipher(), frontend, 60)
			.expect("Frontend fixture should carry a path.");
		let link = reset.issue_link(&email());

		assert!(link.url.starts_with("http://localhost:4000/shop/reset-password?email="));
	}

	#[test]
	fn fresh_link_grants_encrypted_email() {
		let reset = test_password_reset(60);
		let issued = macros::datetime!(2025-11-10 12:00 UTC);
		let link = reset.issue_link_at(&email(), issued);
		let grant = reset
			.validate_at(&link.url, issued + Duration::minutes(59))
			.expect("Fresh link should validate.");

		assert_eq!(grant.email, email());
		assert_ne!(grant.encrypted_email, email().as_ref());
		assert_eq!(
			reset.recover_email(&grant.encrypted_email).expect("Email should decrypt."),
			email()
		);
	}

	#[test]
	fn tampering_and_age_are_distinguished() {
		let reset = test_password_reset(60);
		let issued = macros::datetime!(2025-11-10 12:00 UTC);
		let link = reset.issue_link_at(&email(), issued);
		let forged = link.url.replace("jane", "mike");

		assert!(matches!(reset.validate_at(&forged, issued), Err(Error::InvalidSignature)));
		assert!(matches!(
			reset.validate_at(&link.url, issued + Duration::minutes(61)),
			Err(Error::LinkExpired { max_age_minutes: 60 })
		));
	}

	#[test]
	fn signed_link_without_email_is_rejected() {
		let reset = test_password_reset(60);
		let signed = test_signer().sign("https://shop.example.com/reset-password");

		assert!(matches!(reset.validate(&signed), Err(Error::MissingEmail)));
	}

	#[test]
	fn request_uri_is_joined_to_frontend_origin() {
		let reset = test_password_reset(60);
		let link = reset.issue_link(&email());
		let request_uri = link
			.url
			.strip_prefix(TEST_FRONTEND)
			.expect("Issued link should start with the frontend address.");

		assert!(reset.validate_request_uri(request_uri).is_ok());
	}

	#[test]
	fn recover_rejects_garbage() {
		let reset = test_password_reset(60);

		assert!(matches!(reset.recover_email("not-a-ciphertext"), Err(Error::Crypto(_))));
	}

	#[test]
	fn grant_serializes_encrypted_email_only() {
		let reset = test_password_reset(60);
		let link = reset.issue_link(&email());
		let grant = reset.validate(&link.url).expect("Fresh link should validate.");
		let value = serde_json::to_value(&grant).expect("Grant should serialize.");

		assert_eq!(value, serde_json::json!({ "email": grant.encrypted_email }));
	}

	#[test]
	fn opaque_frontends_are_rejected() {
		let frontend =
			Url::parse("mailto:shop@example.com").expect("Frontend fixture should parse successfully.");

		assert!(matches!(
			PasswordReset::new(test_signer(), test_cipher(), frontend, 60),
			Err(ConfigError::InvalidFrontend { source: None })
		));
	}

	#[test]
	fn issued_at_matches_the_embedded_timestamp() {
		let reset = test_password_reset(60);
		let issued = macros::datetime!(2025-11-10 12:00:00.75 UTC);
		let link = reset.issue_link_at(&email(), issued);
		let parsed = SignedLink::parse(&link.url).expect("Issued link should parse.");

		assert_eq!(link.issued_at, macros::datetime!(2025-11-10 12:00 UTC));
		assert_eq!(parsed.issued_at(), link.issued_at);
	}

	#[test]
	fn complete_yields_email_and_verifiable_hash() {
		let reset = test_password_reset(60);
		let grant = reset.validate(&reset.issue_link(&email()).url).expect("Fresh link should validate.");
		let (recovered, hash) = reset
			.complete(&grant.encrypted_email, "n3w-passw0rd")
			.expect("Completing the reset should succeed.");

		assert_eq!(recovered, email());
		assert!(hash.verify("n3w-passw0rd").is_ok());
		assert!(matches!(
			hash.verify("old-password"),
			Err(crate::auth::PasswordError::Mismatch)
		));
		assert!(matches!(
			reset.complete(&grant.encrypted_email, ""),
			Err(Error::Password(crate::auth::PasswordError::Empty))
		));
		assert!(matches!(reset.complete("garbage", "n3w-passw0rd"), Err(Error::Crypto(_))));
	}
}
