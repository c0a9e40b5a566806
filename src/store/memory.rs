//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{TokenHash, TokenRecord, UserId},
	store::{self, RecordMap, StoreFuture, TokenStore},
};

type StoreMap = Arc<RwLock<RecordMap>>;

/// Thread-safe storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of records currently held, expired ones included.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no records are held.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl TokenStore for MemoryStore {
	fn replace_for_user(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			store::replace_in(&mut map.write(), record);

			Ok(())
		})
	}

	fn find_active<'a>(
		&'a self,
		hash: &'a TokenHash,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<TokenRecord>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(store::find_in(&map.read(), hash, instant)) })
	}

	fn revoke_user(&self, user: UserId) -> StoreFuture<'_, usize> {
		let map = self.0.clone();

		Box::pin(async move { Ok(store::revoke_in(&mut map.write(), user)) })
	}

	fn purge_expired(&self, instant: OffsetDateTime) -> StoreFuture<'_, usize> {
		let map = self.0.clone();

		Box::pin(async move { Ok(store::purge_in(&mut map.write(), instant)) })
	}
}
