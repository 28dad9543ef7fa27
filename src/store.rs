//! Storage contracts and built-in store implementations for gateway sessions.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Session, SessionId},
};

/// Future type returned by [`SessionStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by gateway session stores.
///
/// The gateway exclusively creates and destroys sessions; the proxy only reads
/// them. Backends must support safe concurrent insert/lookup/delete; no ordering
/// is required across distinct sessions.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the session keyed by its identifier.
	fn save(&self, session: Session) -> StoreFuture<'_, ()>;

	/// Fetches the session with the provided identifier, if present.
	fn fetch<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, Option<Session>>;

	/// Fetches the session holding the provided provider access token, if present.
	///
	/// Supports the bearer-provider-token credential transport, where requests
	/// carry the raw upstream token instead of a session identifier.
	fn find_by_token<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<Session>>;

	/// Deletes the session with the provided identifier; absent records are not an error.
	fn delete<'a>(&'a self, id: &'a SessionId) -> StoreFuture<'a, ()>;

	/// Removes every session expired at `now`, returning how many were purged.
	fn sweep(&self, now: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Error type produced by [`SessionStore`] implementations.
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
