//! Simple file-backed [`SessionStore`] for lightweight single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId},
	store::{SessionStore, StoreError, StoreFuture},
};

/// Persists gateway sessions to a JSON snapshot after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<SessionId, Session>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<SessionId, Session>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let entries: Vec<Session> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().map(|session| (session.id.clone(), session)).collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<SessionId, Session>) -> Result<(), StoreError> {
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
}
impl SessionStore for FileStore {
	fn save(&self, session: Session) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(session.id.clone(), session);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn fetch<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<Session>> {
		Box::pin(async move { Ok(self.inner.read().get(id).cloned()) })
	}

	fn find_by_token<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<Session>> {
		Box::pin(async move {
			Ok(self
				.inner
				.read()
				.values()
				.find(|session| session.access_token.expose() == token)
				.cloned())
		})
	}

	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if guard.remove(id).is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(())
		})
	}

	fn sweep(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let before = guard.len();

			guard.retain(|_, session| session.is_active_at(now));

			let purged = before - guard.len();

			if purged > 0 {
				self.persist_locked(&guard)?;
			}

			Ok(purged)
		})
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
	use crate::auth::SiteId;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"seo_gateway_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn build_session() -> Session {
		Session::builder(
			SessionId::generate(),
			SiteId::new("site-demo").expect("Failed to build site fixture."),
		)
		.access_token("access-token")
		.expires_in(Duration::hours(24))
		.build()
		.expect("Failed to build file-store test session.")
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let session = build_session();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(session.clone()))
			.expect("Failed to save fixture session to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.fetch(&session.id))
			.expect("Failed to fetch fixture session from file store.")
			.expect("File store lost session after reopen.");

		assert_eq!(fetched.access_token.expose(), session.access_token.expose());
		assert_eq!(fetched.site, session.site);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn sweep_persists_the_purged_snapshot() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for sweep test.");
		let expired = Session::builder(
			SessionId::generate(),
			SiteId::new("site-expired").expect("Failed to build site fixture."),
		)
		.access_token("stale")
		.created_at(OffsetDateTime::now_utc() - Duration::hours(48))
		.expires_in(Duration::hours(1))
		.build()
		.expect("Failed to build expired session fixture.");
		let expired_id = expired.id.clone();

		rt.block_on(store.save(expired)).expect("Failed to save expired session.");

		let purged = rt
			.block_on(store.sweep(OffsetDateTime::now_utc()))
			.expect("Sweep should succeed on a populated store.");

		assert_eq!(purged, 1);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.fetch(&expired_id))
			.expect("Fetch should succeed after sweep.");

		assert!(fetched.is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
