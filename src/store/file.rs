//! Simple file-backed [`TokenStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenHash, TokenRecord, UserId},
	store::{self, RecordMap, StoreError, StoreFuture, TokenStore},
};

/// Persists token records to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<RecordMap>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<RecordMap, StoreError> {
		if !path.exists() {
			return Ok(RecordMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(RecordMap::new());
		}

		let mut de = serde_json::Deserializer::from_slice(&bytes);
		let records: Vec<TokenRecord> =
			serde_path_to_error::deserialize(&mut de).map_err(|e| StoreError::Serialization {
				message: format!(
					"Failed to parse {} at `{}`: {}",
					path.display(),
					e.path(),
					e.inner()
				),
			})?;

		Ok(records.into_iter().map(|record| (record.token_hash.clone(), record)).collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &RecordMap) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.values().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	/// Applies `f` to a copy of the map and publishes it only once it is on disk.
	fn mutate<T>(&self, f: impl FnOnce(&mut RecordMap) -> T) -> Result<T, StoreError> {
		let mut guard = self.inner.write();
		let mut next = guard.clone();
		let out = f(&mut next);

		self.persist_locked(&next)?;

		*guard = next;

		Ok(out)
	}
}
impl TokenStore for FileStore {
	fn replace_for_user(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|map| store::replace_in(map, record)) })
	}

	fn find_active<'a>(
		&'a self,
		hash: &'a TokenHash,
		instant: OffsetDateTime,
	) -> StoreFuture<'a, Option<TokenRecord>> {
		Box::pin(async move { Ok(store::find_in(&self.inner.read(), hash, instant)) })
	}

	fn revoke_user(&self, user: UserId) -> StoreFuture<'_, usize> {
		Box::pin(async move { self.mutate(|map| store::revoke_in(map, user)) })
	}

	fn purge_expired(&self, instant: OffsetDateTime) -> StoreFuture<'_, usize> {
		Box::pin(async move { self.mutate(|map| store::purge_in(map, instant)) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::{AuthToken, Email, TokenScope, hash_token};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"storefront_auth_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn build_token() -> (AuthToken, TokenRecord) {
		let user = UserId::new(11).expect("Failed to build user fixture.");
		let email = Email::new("jane@shop.example.com").expect("Failed to build email fixture.");
		let token = AuthToken::generate(user, Duration::hours(1), TokenScope::Authentication)
			.expect("Failed to generate token fixture.");
		let record = TokenRecord::from_token(&token, email, OffsetDateTime::now_utc());

		(token, record)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let (token, record) = build_token();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.replace_for_user(record.clone()))
			.expect("Failed to save fixture record to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let hash = hash_token(token.plaintext.expose());
		let fetched = rt
			.block_on(reopened.find_active(&hash, OffsetDateTime::now_utc()))
			.expect("Failed to fetch fixture record from file store.")
			.expect("File store lost record after reopen.");

		assert_eq!(fetched, record);

		let revoked = rt
			.block_on(reopened.revoke_user(record.user_id))
			.expect("Failed to revoke fixture record.");

		assert_eq!(revoked, 1);
		let emptied = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert!(emptied.inner.read().is_empty());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_reports_path() {
		let path = temp_path();

		fs::write(&path, br#"[{"user_id": 0}]"#).expect("Failed to write corrupt snapshot.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshot should fail to load.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_persist_leaves_memory_untouched() {
		let dir = temp_path();
		let path = dir.join("tokens.json");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let (token, record) = build_token();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.replace_for_user(record.clone()))
			.expect("Failed to save fixture record to file store.");

		// A directory in place of the temporary file makes the next write fail.
		fs::create_dir_all(path.with_extension("tmp"))
			.expect("Failed to block temporary snapshot path.");

		let err = rt
			.block_on(store.revoke_user(record.user_id))
			.expect_err("Revocation should fail when the snapshot cannot be written.");

		assert!(matches!(err, StoreError::Backend { .. }));

		let hash = hash_token(token.plaintext.expose());
		let fetched = rt
			.block_on(store.find_active(&hash, OffsetDateTime::now_utc()))
			.expect("Failed to fetch fixture record from file store.");

		assert_eq!(fetched, Some(record));

		fs::remove_dir_all(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store directory {}: {e}", dir.display())
		});
	}
}
