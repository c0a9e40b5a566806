//! Strongly typed user identifiers shared by tokens and reset links.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const EMAIL_MAX_LEN: usize = 254;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (user, email).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (user, email).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed byte count.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Kind of identifier (user, email).
		kind: &'static str,
		/// Maximum permitted byte count.
		max: usize,
	},
	/// The e-mail address is not of the `local@domain` shape.
	#[error("Email address must contain exactly one `@` between non-empty parts.")]
	MalformedEmail,
	/// Numeric user identifiers start at one.
	#[error("User identifier must be positive, got {value}.")]
	NonPositive {
		/// Rejected value.
		value: i64,
	},
}

/// Database identifier of a storefront user.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);
impl UserId {
	/// Creates a new identifier after validation.
	pub fn new(value: i64) -> Result<Self, IdentifierError> {
		if value <= 0 {
			return Err(IdentifierError::NonPositive { value });
		}

		Ok(Self(value))
	}

	/// Returns the raw database value.
	pub const fn get(self) -> i64 {
		self.0
	}
}
impl From<UserId> for i64 {
	fn from(value: UserId) -> Self {
		value.0
	}
}
impl TryFrom<i64> for UserId {
	type Error = IdentifierError;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "User({})", self.0)
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}

/// Validated e-mail address used as the password-reset subject.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);
impl Email {
	/// Creates a new address after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_email(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for Email {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for Email {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<Email> for String {
	fn from(value: Email) -> Self {
		value.0
	}
}
impl TryFrom<String> for Email {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_email(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for Email {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for Email {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Email({})", self.0)
	}
}
impl Display for Email {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for Email {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_email(view: &str) -> Result<(), IdentifierError> {
	const KIND: &str = "Email";

	if view.is_empty() {
		return Err(IdentifierError::Empty { kind: KIND });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind: KIND });
	}
	if view.len() > EMAIL_MAX_LEN {
		return Err(IdentifierError::TooLong { kind: KIND, max: EMAIL_MAX_LEN });
	}

	match view.split_once('@') {
		Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
			Ok(()),
		_ => Err(IdentifierError::MalformedEmail),
	}
}
