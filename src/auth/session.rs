//! Session records binding a local caller to a provider access token and site.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, SessionId, SiteId, UserId},
};

/// Current lifecycle status for a session record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
	/// Session is currently valid and may authorize proxied calls.
	Active,
	/// Session exceeded its expiry instant and must never authorize a call.
	Expired,
}

/// Errors produced by [`SessionBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Record describing one authenticated linkage between a local actor and a provider site.
#[derive(Serialize, Deserialize, Clone)]
pub struct Session {
	/// Opaque unique session identifier.
	pub id: SessionId,
	/// Provider access token secret; callers must avoid logging it.
	pub access_token: AccessToken,
	/// Site the token was bound to during authorization.
	pub site: SiteId,
	/// Short name of the bound site, when the provider reports one.
	pub site_short_name: Option<String>,
	/// Provider account that granted the token, when known.
	pub user: Option<UserId>,
	/// Creation instant recorded when the session was minted.
	pub created_at: OffsetDateTime,
	/// Expiry instant after which the session must not authorize calls.
	pub expires_at: OffsetDateTime,
}
impl Session {
	/// Returns a builder seeded with the required identifier and site binding.
	pub fn builder(id: SessionId, site: SiteId) -> SessionBuilder {
		SessionBuilder::new(id, site)
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> SessionStatus {
		if instant >= self.expires_at {
			return SessionStatus::Expired;
		}

		SessionStatus::Active
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> SessionStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the session is active at the provided instant.
	pub fn is_active_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), SessionStatus::Active)
	}

	/// Returns `true` if the session is currently active.
	pub fn is_active(&self) -> bool {
		matches!(self.status(), SessionStatus::Active)
	}

	/// Returns `true` if the session has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), SessionStatus::Expired)
	}

	/// Returns `true` if the session is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		matches!(self.status(), SessionStatus::Expired)
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("id", &self.id)
			.field("access_token", &"<redacted>")
			.field("site", &self.site)
			.field("site_short_name", &self.site_short_name)
			.field("user", &self.user)
			.field("created_at", &self.created_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Session`].
#[derive(Clone, Debug)]
pub struct SessionBuilder {
	id: SessionId,
	site: SiteId,
	access_token: Option<AccessToken>,
	site_short_name: Option<String>,
	user: Option<UserId>,
	created_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl SessionBuilder {
	fn new(id: SessionId, site: SiteId) -> Self {
		Self {
			id,
			site,
			access_token: None,
			site_short_name: None,
			user: None,
			created_at: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Provides the provider access token.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(AccessToken::new(token));

		self
	}

	/// Records the short name of the bound site.
	pub fn site_short_name(mut self, short_name: impl Into<String>) -> Self {
		self.site_short_name = Some(short_name.into());

		self
	}

	/// Records the provider account that granted the token.
	pub fn user(mut self, user: UserId) -> Self {
		self.user = Some(user);

		self
	}

	/// Sets the creation instant.
	pub fn created_at(mut self, instant: OffsetDateTime) -> Self {
		self.created_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the creation instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`Session`].
	pub fn build(self) -> Result<Session, SessionBuilderError> {
		let access_token = self.access_token.ok_or(SessionBuilderError::MissingAccessToken)?;
		let created_at = self.created_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => created_at + delta,
			(None, None) => return Err(SessionBuilderError::MissingExpiry),
		};

		Ok(Session {
			id: self.id,
			access_token,
			site: self.site,
			site_short_name: self.site_short_name,
			user: self.user,
			created_at,
			expires_at,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn ids() -> (SessionId, SiteId) {
		(
			SessionId::new("session-1").expect("Session fixture should be valid."),
			SiteId::new("site-1").expect("Site fixture should be valid."),
		)
	}

	#[test]
	fn status_flips_exactly_at_expiry() {
		let (id, site) = ids();
		let created = macros::datetime!(2025-06-01 00:00 UTC);
		let expires = macros::datetime!(2025-06-02 00:00 UTC);
		let session = Session::builder(id, site)
			.access_token("access")
			.created_at(created)
			.expires_at(expires)
			.build()
			.expect("Session builder should succeed for status transitions.");

		assert_eq!(
			session.status_at(macros::datetime!(2025-06-01 12:00 UTC)),
			SessionStatus::Active
		);
		assert_eq!(
			session.status_at(macros::datetime!(2025-06-02 00:00 UTC)),
			SessionStatus::Expired
		);
		assert!(session.is_expired_at(macros::datetime!(2025-06-03 00:00 UTC)));
	}

	#[test]
	fn builder_handles_relative_expiry() {
		let (id, site) = ids();
		let session = Session::builder(id, site)
			.access_token("secret")
			.created_at(macros::datetime!(2025-06-01 00:00 UTC))
			.expires_in(Duration::hours(24))
			.build()
			.expect("Session builder should support relative expiry calculations.");

		assert_eq!(session.expires_at, macros::datetime!(2025-06-02 00:00 UTC));
	}

	#[test]
	fn builder_requires_token_and_expiry() {
		let (id, site) = ids();

		assert!(matches!(
			Session::builder(id.clone(), site.clone()).expires_in(Duration::hours(1)).build(),
			Err(SessionBuilderError::MissingAccessToken)
		));
		assert!(matches!(
			Session::builder(id, site).access_token("t").build(),
			Err(SessionBuilderError::MissingExpiry)
		));
	}

	#[test]
	fn debug_redacts_the_access_token() {
		let (id, site) = ids();
		let session = Session::builder(id, site)
			.access_token("super-secret")
			.expires_in(Duration::hours(1))
			.build()
			.expect("Session builder should succeed.");

		let rendered = format!("{session:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("super-secret"));
	}
}
