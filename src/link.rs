//! Stateless signed URLs with embedded issue timestamps.
//!
//! A signed link has the shape `<url><sep>hash=<ts>.<mac>` where `<sep>` is `?` (or `&` when
//! the URL already carries a query), `<ts>` is the big-endian Unix-seconds issue instant and
//! `<mac>` is the HMAC-SHA256 tag over everything before the final `.`; both segments are
//! base64url without padding, which never produces a `.`.
//!
//! Authenticity ([`UrlSigner::verify`]) and freshness ([`expired`]) are independent checks;
//! a link is acceptable only when both pass. [`UrlSigner::check`] runs both.

pub mod signer;

pub use signer::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Query parameter carrying the timestamp and MAC.
pub const HASH_PARAM: &str = "hash";

const HASH_MARKER: &str = "hash=";
const MAC_SEPARATOR: char = '.';

/// Outcome of checking a signed link for authenticity and age.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkStatus {
	/// Signature matches and the link is within its validity window.
	Fresh,
	/// Signature matches but the link is older than the validity window.
	Expired,
	/// MAC mismatch or malformed link.
	InvalidSignature,
}
impl LinkStatus {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LinkStatus::Fresh => "fresh",
			LinkStatus::Expired => "expired",
			LinkStatus::InvalidSignature => "invalid_signature",
		}
	}

	/// Returns `true` only for [`LinkStatus::Fresh`].
	pub const fn is_fresh(self) -> bool {
		matches!(self, LinkStatus::Fresh)
	}
}
impl Display for LinkStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Borrowed view over the segments of a signed link.
///
/// Parsing only checks structure; it says nothing about authenticity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedLink<'a> {
	payload: &'a str,
	base_url: &'a str,
	mac: &'a str,
	issued_at: OffsetDateTime,
}
impl<'a> SignedLink<'a> {
	/// Splits a signed link into its segments, returning `None` on any structural problem.
	pub fn parse(raw: &'a str) -> Option<Self> {
		let (payload, mac) = raw.rsplit_once(MAC_SEPARATOR)?;
		let (prefix, encoded_ts) = payload.rsplit_once(HASH_MARKER)?;
		let base_url = prefix.strip_suffix('?').or_else(|| prefix.strip_suffix('&'))?;

		if mac.is_empty() {
			return None;
		}

		let issued_at = decode_timestamp(encoded_ts)?;

		Some(Self { payload, base_url, mac, issued_at })
	}

	/// The URL that was signed, without the appended `hash` parameter.
	pub fn base_url(&self) -> &'a str {
		self.base_url
	}

	/// Issue instant embedded in the link (second precision).
	pub fn issued_at(&self) -> OffsetDateTime {
		self.issued_at
	}

	/// Elapsed time between issuance and `now`.
	pub fn age_at(&self, now: OffsetDateTime) -> Duration {
		now - self.issued_at
	}

	/// Returns `true` when the link is strictly older than `max_age_minutes` at `now`.
	pub fn is_expired_at(&self, max_age_minutes: u32, now: OffsetDateTime) -> bool {
		self.age_at(now) > Duration::minutes(i64::from(max_age_minutes))
	}

	pub(crate) fn payload(&self) -> &'a str {
		self.payload
	}

	pub(crate) fn mac(&self) -> &'a str {
		self.mac
	}
}

/// Returns `true` if the link is older than `max_age_minutes`, or cannot be parsed.
///
/// Does not check authenticity; pair with [`UrlSigner::verify`].
pub fn expired(signed: &str, max_age_minutes: u32) -> bool {
	expired_at(signed, max_age_minutes, OffsetDateTime::now_utc())
}

/// [`expired`] evaluated against a caller-supplied clock.
pub fn expired_at(signed: &str, max_age_minutes: u32, now: OffsetDateTime) -> bool {
	SignedLink::parse(signed).is_none_or(|link| link.is_expired_at(max_age_minutes, now))
}

pub(crate) fn encode_timestamp(instant: OffsetDateTime) -> String {
	URL_SAFE_NO_PAD.encode(instant.unix_timestamp().to_be_bytes())
}

fn decode_timestamp(encoded: &str) -> Option<OffsetDateTime> {
	let bytes: [u8; 8] = URL_SAFE_NO_PAD.decode(encoded).ok()?.try_into().ok()?;

	OffsetDateTime::from_unix_timestamp(i64::from_be_bytes(bytes)).ok()
}
