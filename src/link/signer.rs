//! HMAC-SHA256 signer producing and verifying signed links.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::SigningKey,
	error::ConfigError,
	link::{self, HASH_PARAM, LinkStatus, MAC_SEPARATOR, SignedLink},
};

type HmacSha256 = Hmac<Sha256>;

/// Signs URLs and verifies previously signed ones using a shared symmetric key.
///
/// Holds no mutable state; share freely across threads.
#[derive(Clone)]
pub struct UrlSigner {
	mac: HmacSha256,
}
impl UrlSigner {
	/// Keys the signer with the provided secret.
	pub fn new(key: SigningKey) -> Result<Self, ConfigError> {
		let mac = <HmacSha256 as Mac>::new_from_slice(key.expose())
			.map_err(|_| ConfigError::InvalidKeyLength { len: key.len() })?;

		Ok(Self { mac })
	}

	/// Appends the current timestamp and a MAC to `url`.
	pub fn sign(&self, url: &str) -> String {
		self.sign_at(url, OffsetDateTime::now_utc())
	}

	/// Appends `issued_at` (truncated to seconds) and a MAC to `url`.
	pub fn sign_at(&self, url: &str, issued_at: OffsetDateTime) -> String {
		let separator = if url.contains('?') { '&' } else { '?' };
		let payload =
			format!("{url}{separator}{HASH_PARAM}={}", link::encode_timestamp(issued_at));
		let mut mac = self.mac.clone();

		mac.update(payload.as_bytes());

		let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

		format!("{payload}{MAC_SEPARATOR}{tag}")
	}

	/// Returns `true` only if the embedded MAC matches the recomputed one.
	///
	/// Comparison is constant-time. Malformed input yields `false`.
	pub fn verify(&self, signed: &str) -> bool {
		let Some(link) = SignedLink::parse(signed) else {
			return false;
		};
		let Ok(tag) = URL_SAFE_NO_PAD.decode(link.mac()) else {
			return false;
		};
		let mut mac = self.mac.clone();

		mac.update(link.payload().as_bytes());

		mac.verify_slice(&tag).is_ok()
	}

	/// Shorthand for [`link::expired`]; does not check the signature.
	pub fn expired(&self, signed: &str, max_age_minutes: u32) -> bool {
		link::expired(signed, max_age_minutes)
	}

	/// Runs both checks; an invalid signature takes precedence over expiry.
	pub fn check(&self, signed: &str, max_age_minutes: u32) -> LinkStatus {
		self.check_at(signed, max_age_minutes, OffsetDateTime::now_utc())
	}

	/// [`UrlSigner::check`] evaluated against a caller-supplied clock.
	pub fn check_at(&self, signed: &str, max_age_minutes: u32, now: OffsetDateTime) -> LinkStatus {
		if !self.verify(signed) {
			return LinkStatus::InvalidSignature;
		}
		if link::expired_at(signed, max_age_minutes, now) {
			return LinkStatus::Expired;
		}

		LinkStatus::Fresh
	}
}
impl Debug for UrlSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("UrlSigner(<redacted>)")
	}
}
