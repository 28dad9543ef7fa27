//! Session lifecycle service shared by the gateway (mint/end) and proxy (resolve).

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Session, SessionId, SiteId, UserId},
	credential::Credential,
	error::ConfigError,
	store::SessionStore,
};

/// Owns session lifecycle on top of a pluggable [`SessionStore`].
///
/// The gateway exclusively mints and ends sessions; the proxy resolves them (and
/// triggers `end` when upstream revokes a token). Expiry is evaluated lazily at
/// resolve time, with [`sweep`](Self::sweep) available as an optional background
/// purge.
pub struct SessionRegistry {
	store: Arc<dyn SessionStore>,
	ttl: Duration,
}
impl SessionRegistry {
	/// Creates a registry minting sessions with the provided time-to-live.
	pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
		Self { store, ttl }
	}

	/// Returns the backing store handle.
	pub fn store(&self) -> &Arc<dyn SessionStore> {
		&self.store
	}

	/// Mints and persists a session for a freshly issued access token.
	///
	/// The configured TTL governs expiry; a provider-supplied `expires_in` hint
	/// only shortens it, never extends it.
	pub async fn mint(
		&self,
		access_token: AccessToken,
		expires_hint: Option<Duration>,
		site: SiteId,
		site_short_name: Option<String>,
		user: Option<UserId>,
	) -> Result<Session> {
		let ttl = expires_hint
			.filter(|hint| hint.is_positive() && *hint < self.ttl)
			.unwrap_or(self.ttl);
		let mut builder = Session::builder(SessionId::generate(), site)
			.access_token(access_token.expose())
			.expires_in(ttl);

		if let Some(short_name) = site_short_name {
			builder = builder.site_short_name(short_name);
		}
		if let Some(user) = user {
			builder = builder.user(user);
		}

		let session = builder.build().map_err(ConfigError::from)?;

		self.store.save(session.clone()).await?;

		Ok(session)
	}

	/// Returns the live session matching the credential, purging it when expired.
	pub async fn resolve(&self, credential: &Credential) -> Result<Option<Session>> {
		let found = match credential {
			Credential::Session(id) => self.store.fetch(id).await?,
			Credential::ProviderToken(token) => self.store.find_by_token(token).await?,
		};
		let Some(session) = found else { return Ok(None) };

		if session.is_active_at(OffsetDateTime::now_utc()) {
			Ok(Some(session))
		} else {
			self.store.delete(&session.id).await?;

			Ok(None)
		}
	}

	/// Deletes the session; absent records are not an error.
	pub async fn end(&self, id: &SessionId) -> Result<()> {
		self.store.delete(id).await?;

		Ok(())
	}

	/// Removes every expired session, returning how many were purged.
	pub async fn sweep(&self) -> Result<usize> {
		Ok(self.store.sweep(OffsetDateTime::now_utc()).await?)
	}
}
impl Debug for SessionRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionRegistry").field("ttl", &self.ttl).finish()
	}
}
