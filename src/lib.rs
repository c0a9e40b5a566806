//! Stateless signed URLs, field encryption, and hashed bearer tokens for storefront
//! password-reset and API authentication flows.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cipher;
pub mod config;
pub mod error;
pub mod flows;
pub mod link;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::SigningKey,
		cipher::FieldCipher,
		flows::{PasswordReset, TokenIssuer},
		link::UrlSigner,
		store::{MemoryStore, TokenStore},
	};

	/// 32-byte key usable for both HMAC signing and AES-256-GCM.
	pub const TEST_KEY: &str = "0123456789abcdef0123456789abcdef";
	/// Minimum bcrypt cost, keeping password fixtures fast.
	pub const TEST_PASSWORD_COST: u32 = 4;
	/// Frontend address used by reset-flow fixtures.
	pub const TEST_FRONTEND: &str = "https://shop.example.com";

	/// Builds a [`UrlSigner`] over [`TEST_KEY`].
	pub fn test_signer() -> UrlSigner {
		let key = SigningKey::new(TEST_KEY).expect("Test key fixture should be non-empty.");

		UrlSigner::new(key).expect("HMAC accepts keys of any length.")
	}

	/// Builds an AES-256-GCM [`FieldCipher`] over [`TEST_KEY`].
	pub fn test_cipher() -> FieldCipher {
		FieldCipher::new(TEST_KEY.as_bytes()).expect("Test key fixture should be 32 bytes.")
	}

	/// Builds a [`PasswordReset`] flow rooted at [`TEST_FRONTEND`] with the provided link age.
	pub fn test_password_reset(max_age_minutes: u32) -> PasswordReset {
		let frontend =
			Url::parse(TEST_FRONTEND).expect("Frontend fixture should parse successfully.");

		PasswordReset::new(test_signer(), test_cipher(), frontend, max_age_minutes)
			.expect("Frontend fixture should carry a path.")
			.with_password_cost(TEST_PASSWORD_COST)
	}

	/// Constructs a [`TokenIssuer`] backed by an in-memory store.
	pub fn build_memory_issuer(ttl: Duration) -> (TokenIssuer, Arc<MemoryStore>) {
		let backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = backend.clone();

		(TokenIssuer::new(store, ttl), backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use {color_eyre as _, tokio as _};
