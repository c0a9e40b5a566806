//! Storage contracts and built-in store implementations for authentication token records.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{TokenHash, TokenRecord, UserId},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by token stores.
///
/// Only token hashes are persisted; a user owns at most one record at a time.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Deletes every record owned by `record.user_id`, then inserts `record`.
	fn replace_for_user(&self, record: TokenRecord) -> StoreFuture<'_, ()>;

	/// Fetches the record matching `hash` if it has not expired at `instant`.
	fn find_active<'a>(
		&'a self,
		hash: &'a TokenHash,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<TokenRecord>>;

	/// Deletes every record owned by `user`, returning how many were removed.
	fn revoke_user(&self, user: UserId) -> StoreFuture<'_, usize>;

	/// Deletes every record expired at `instant`, returning how many were removed.
	fn purge_expired(&self, instant: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

type RecordMap = HashMap<TokenHash, TokenRecord>;

fn replace_in(map: &mut RecordMap, record: TokenRecord) {
	map.retain(|_, existing| existing.user_id != record.user_id);
	map.insert(record.token_hash.clone(), record);
}

fn find_in(map: &RecordMap, hash: &TokenHash, instant: OffsetDateTime) -> Option<TokenRecord> {
	map.get(hash).filter(|record| record.is_active_at(instant)).cloned()
}

fn revoke_in(map: &mut RecordMap, user: UserId) -> usize {
	let before = map.len();

	map.retain(|_, record| record.user_id != user);

	before - map.len()
}

fn purge_in(map: &mut RecordMap, instant: OffsetDateTime) -> usize {
	let before = map.len();

	map.retain(|_, record| record.is_active_at(instant));

	before - map.len()
}
