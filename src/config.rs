//! Process configuration loaded from environment variables at startup.

// std
use std::{env, num::ParseIntError};
// self
use crate::{_prelude::*, auth::SigningKey, error::ConfigError};

/// Environment variable holding the shared HMAC/AES key.
pub const TOKEN_SYMMETRIC_KEY: &str = "TOKEN_SYMMETRIC_KEY";
/// Environment variable holding the public frontend base URL.
pub const FRONTEND_ADDR: &str = "FRONTEND_ADDR";
/// Environment variable overriding the reset-link lifetime in minutes.
pub const RESET_LINK_MAX_AGE_MINUTES: &str = "RESET_LINK_MAX_AGE_MINUTES";
/// Environment variable overriding the authentication-token lifetime in minutes.
pub const AUTH_TOKEN_TTL_MINUTES: &str = "AUTH_TOKEN_TTL_MINUTES";

const DEFAULT_RESET_LINK_MAX_AGE_MINUTES: u32 = 60;
const DEFAULT_AUTH_TOKEN_TTL_MINUTES: u32 = 24 * 60;
const MAX_AUTH_TOKEN_TTL_MINUTES: u32 = 366 * 24 * 60;

/// Settings shared by the reset and authentication flows.
#[derive(Clone, Debug)]
pub struct AuthConfig {
	/// Shared symmetric key; signs links and encrypts fields.
	pub token_symmetric_key: SigningKey,
	/// Frontend base URL that reset links point at.
	pub frontend_addr: Url,
	/// Reset-link lifetime in minutes.
	pub reset_link_max_age_minutes: u32,
	/// Authentication-token lifetime.
	pub auth_token_ttl: Duration,
}
impl AuthConfig {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Reads the configuration through `lookup`, which returns `None` for unset variables.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let require = |name: &'static str| {
			lookup(name).filter(|v| !v.is_empty()).ok_or(ConfigError::MissingVar { name })
		};
		let key = require(TOKEN_SYMMETRIC_KEY)?;
		let token_symmetric_key = SigningKey::new(key.as_bytes())?;

		if !matches!(token_symmetric_key.len(), 16 | 24 | 32) {
			return Err(ConfigError::InvalidKeyLength { len: token_symmetric_key.len() });
		}

		let frontend_addr = Url::parse(&require(FRONTEND_ADDR)?)
			.map_err(|source| ConfigError::InvalidFrontend { source: Some(source) })?;

		if frontend_addr.cannot_be_a_base() {
			return Err(ConfigError::InvalidFrontend { source: None });
		}

		let reset_link_max_age_minutes = parse_minutes(
			RESET_LINK_MAX_AGE_MINUTES,
			lookup(RESET_LINK_MAX_AGE_MINUTES),
			DEFAULT_RESET_LINK_MAX_AGE_MINUTES,
		)?;
		let auth_token_minutes = parse_minutes(
			AUTH_TOKEN_TTL_MINUTES,
			lookup(AUTH_TOKEN_TTL_MINUTES),
			DEFAULT_AUTH_TOKEN_TTL_MINUTES,
		)?;

		if !(1..=MAX_AUTH_TOKEN_TTL_MINUTES).contains(&auth_token_minutes) {
			return Err(ConfigError::InvalidVar {
				name: AUTH_TOKEN_TTL_MINUTES,
				reason: format!("token lifetime must be between 1 and {MAX_AUTH_TOKEN_TTL_MINUTES}"),
			});
		}

		Ok(Self {
			token_symmetric_key,
			frontend_addr,
			reset_link_max_age_minutes,
			auth_token_ttl: Duration::minutes(i64::from(auth_token_minutes)),
		})
	}
}

fn parse_minutes(
	name: &'static str,
	value: Option<String>,
	default: u32,
) -> Result<u32, ConfigError> {
	match value.as_deref().map(str::trim) {
		None | Some("") => Ok(default),
		Some(raw) => raw.parse().map_err(|e: ParseIntError| ConfigError::InvalidVar {
			name,
			reason: e.to_string(),
		}),
	}
}
