//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId},
	store::{SessionStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<SessionId, Session>>>;

/// Thread-safe storage backend that keeps sessions in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn save_now(map: StoreMap, session: Session) -> Result<(), StoreError> {
		map.write().insert(session.id.clone(), session);

		Ok(())
	}

	fn fetch_now(map: StoreMap, id: SessionId) -> Option<Session> {
		map.read().get(&id).cloned()
	}

	fn find_now(map: StoreMap, token: String) -> Option<Session> {
		map.read().values().find(|session| session.access_token.expose() == token).cloned()
	}

	fn delete_now(map: StoreMap, id: SessionId) {
		map.write().remove(&id);
	}

	fn sweep_now(map: StoreMap, now: OffsetDateTime) -> usize {
		let mut guard = map.write();
		let before = guard.len();

		guard.retain(|_, session| session.is_active_at(now));

		before - guard.len()
	}
}
impl SessionStore for MemoryStore {
	fn save(&self, session: Session) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::save_now(map, session) })
	}

	fn fetch<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<Session>> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move { Ok(Self::fetch_now(map, id)) })
	}

	fn find_by_token<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<Session>> {
		let map = self.0.clone();
		let token = token.to_owned();

		Box::pin(async move { Ok(Self::find_now(map, token)) })
	}

	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move {
			Self::delete_now(map, id);

			Ok(())
		})
	}

	fn sweep(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::sweep_now(map, now)) })
	}
}
