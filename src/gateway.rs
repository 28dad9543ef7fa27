//! The Authorization Gateway: OAuth 2.0 authorization-code flow orchestration and
//! session lifecycle management.

pub mod attempt;
pub mod registry;

pub use attempt::*;
pub use registry::*;

// std
use std::collections::BTreeMap;
// self
use crate::{
	_prelude::*,
	api::DataApi,
	auth::{AccessToken, ScopeSet, Session, SiteId},
	error::ConfigError,
	http::TokenHttpClient,
	oauth::{BasicFacade, OAuth2Facade, TransportErrorMapper},
	obs::{self, OpKind, OpOutcome, OpSpan},
	provider::{ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport stack.
pub type ReqwestGateway = Gateway<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Pending anti-forgery states expire after this window even if never consumed.
const STATE_TTL: Duration = Duration::minutes(10);

/// Callback query parameters forwarded by the provider redirect.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CallbackParams {
	/// Authorization code, present on success.
	pub code: Option<String>,
	/// Anti-forgery state echoed back by the provider.
	pub state: Option<String>,
	/// Provider error code, present on denial.
	pub error: Option<String>,
	/// Provider error description accompanying `error`.
	pub error_description: Option<String>,
}

/// Drives the OAuth 2.0 authorization-code grant against a single provider
/// descriptor and maintains the resulting sessions.
///
/// The gateway owns the token-exchange HTTP client, provider descriptor, strategy,
/// and data API handle; the [`SessionRegistry`] it shares with the proxy owns the
/// session store. Client credentials are stored alongside the descriptor so the
/// configured client auth method is applied consistently at the token endpoint.
#[derive(Clone)]
pub struct Gateway<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for token endpoint requests.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Session registry shared with the proxy.
	pub sessions: Arc<SessionRegistry>,
	/// Data API handle used for post-exchange enrichment calls.
	pub api: Arc<dyn DataApi>,
	/// Provider descriptor that defines OAuth endpoints and the data API base.
	pub descriptor: ProviderDescriptor,
	/// Strategy responsible for provider-specific token request adjustments.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth 2.0 client identifier used in every grant.
	pub client_id: String,
	/// Optional client secret for confidential authentication methods.
	pub client_secret: Option<String>,
	/// Redirect URI; must match the authorize request byte for byte at exchange time.
	pub redirect_uri: Url,
	/// Scope set requested during authorization.
	pub scope: ScopeSet,
	pending_states: Arc<Mutex<HashMap<String, OffsetDateTime>>>,
}
impl<C, M> Gateway<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a gateway that reuses the caller-provided transport + mapper pair.
	#[allow(clippy::too_many_arguments)]
	pub fn with_http_client(
		sessions: Arc<SessionRegistry>,
		api: Arc<dyn DataApi>,
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
		redirect_uri: Url,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			sessions,
			api,
			descriptor,
			strategy,
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri,
			scope: ScopeSet::default(),
			pending_states: Default::default(),
		}
	}

	/// Sets or replaces the client secret used for confidential client auth modes.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets or replaces the scope set requested during authorization.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Constructs the authorization redirect target and registers its anti-forgery
	/// state for later validation.
	///
	/// Fails with a [`ConfigError`] when the client identifier is blank; the
	/// redirect URI is validated at construction by virtue of being a [`Url`].
	pub fn begin_authorization(&self) -> Result<AuthorizationAttempt> {
		const KIND: OpKind = OpKind::Authorize;

		let _guard = OpSpan::new(KIND, "begin_authorization").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		if self.client_id.trim().is_empty() {
			obs::record_op_outcome(KIND, OpOutcome::Failure);

			return Err(ConfigError::MissingValue { name: "client_id" }.into());
		}

		let attempt = attempt::build_attempt(
			&self.descriptor,
			&self.client_id,
			&self.scope,
			self.redirect_uri.clone(),
		);

		self.register_state(&attempt.state);
		obs::record_op_outcome(KIND, OpOutcome::Success);

		Ok(attempt)
	}

	/// Completes the authorization-code flow: validates the callback, exchanges the
	/// code, enriches with the token identity and site listing, and mints a session
	/// bound to the first listed site.
	pub async fn complete_authorization(&self, callback: CallbackParams) -> Result<Session> {
		const KIND: OpKind = OpKind::Exchange;

		let span = OpSpan::new(KIND, "complete_authorization");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(error) = callback.error {
					return Err(Error::AuthorizationDenied {
						error,
						description: callback.error_description,
					});
				}

				let code = callback
					.code
					.filter(|code| !code.trim().is_empty())
					.ok_or(Error::MissingCode)?;

				self.consume_state(callback.state.as_deref())?;

				let secret = self
					.client_secret
					.as_deref()
					.ok_or(ConfigError::MissingValue { name: "client_secret" })?;
				let mut form = BTreeMap::new();

				self.strategy.augment_token_request(&mut form);

				let extra_params: Vec<(String, String)> = form.into_iter().collect();
				let facade: BasicFacade<C, M> = BasicFacade::from_descriptor(
					&self.descriptor,
					&self.client_id,
					Some(secret),
					&self.redirect_uri,
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;
				let issued = facade
					.exchange_authorization_code(
						self.strategy.as_ref(),
						&code,
						&self.redirect_uri,
						extra_params.as_slice(),
					)
					.await?;
				let user = self
					.api
					.authorized_user(&issued.access_token)
					.await
					.map_err(|err| err.into_error())?;
				let sites = self
					.api
					.list_sites(&issued.access_token)
					.await
					.map_err(|err| err.into_error())?;
				let site = sites.into_iter().next().ok_or(Error::NoSitesFound)?;

				self.sessions
					.mint(
						issued.access_token,
						issued.expires_in,
						site.id,
						site.short_name,
						user.map(|user| user.id),
					)
					.await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Verifies a caller-supplied provider access token against the identity
	/// endpoint and mints a session bound to the supplied site.
	///
	/// Supports host-application deployments that obtain tokens out of band and
	/// hand them to the gateway instead of running the redirect flow.
	pub async fn verify_provider_token(&self, token: &str, site: SiteId) -> Result<Session> {
		const KIND: OpKind = OpKind::VerifyToken;

		let span = OpSpan::new(KIND, "verify_provider_token");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				if token.trim().is_empty() {
					return Err(Error::InvalidRequest { reason: "access token is blank".into() });
				}

				let token = AccessToken::new(token);
				let user = self
					.api
					.authorized_user(&token)
					.await
					.map_err(|err| err.into_error())?
					.ok_or(Error::Unauthorized)?;

				self.sessions.mint(token, None, site, None, Some(user.id)).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	fn register_state(&self, state: &str) {
		let now = OffsetDateTime::now_utc();
		let mut guard = self.pending_states.lock();

		guard.retain(|_, minted| now - *minted < STATE_TTL);
		guard.insert(state.to_owned(), now);
	}

	fn consume_state(&self, state: Option<&str>) -> Result<()> {
		let state = state
			.filter(|state| !state.is_empty())
			.ok_or_else(|| Error::InvalidCallback { reason: "missing state".into() })?;
		let now = OffsetDateTime::now_utc();
		let minted = self
			.pending_states
			.lock()
			.remove(state)
			.ok_or_else(|| Error::InvalidCallback { reason: "unknown or reused state".into() })?;

		if now - minted >= STATE_TTL {
			return Err(Error::InvalidCallback { reason: "state expired".into() });
		}

		Ok(())
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new gateway for the provided descriptor and client identifier.
	///
	/// The gateway provisions its own reqwest-backed transport so callers do not
	/// need to pass HTTP handles explicitly. Use [`Gateway::with_client_secret`] to
	/// attach the confidential client secret required by the code exchange.
	pub fn new(
		sessions: Arc<SessionRegistry>,
		api: Arc<dyn DataApi>,
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
		redirect_uri: Url,
	) -> Self {
		Self::with_http_client(
			sessions,
			api,
			descriptor,
			strategy,
			client_id,
			redirect_uri,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for Gateway<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri)
			.field("scope", &self.scope)
			.finish()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	fn descriptor() -> ProviderDescriptor {
		use crate::auth::ProviderId;

		ProviderDescriptor::builder(
			ProviderId::new("test-cms").expect("Provider identifier should be valid."),
		)
		.authorization_endpoint(
			Url::parse("https://cms.example.com/oauth/authorize")
				.expect("Authorization endpoint should parse."),
		)
		.token_endpoint(
			Url::parse("https://cms.example.com/oauth/token")
				.expect("Token endpoint should parse."),
		)
		.api_base(Url::parse("https://api.example.com/v2").expect("API base should parse."))
		.build()
		.expect("Descriptor should build.")
	}

	#[test]
	fn begin_authorization_registers_a_single_use_state() {
		let (gateway, _store, _sessions) = build_test_gateway(descriptor(), "client-1", "secret");
		let attempt =
			gateway.begin_authorization().expect("Authorization attempt should start.");

		assert!(gateway.consume_state(Some(&attempt.state)).is_ok());
		assert!(matches!(
			gateway.consume_state(Some(&attempt.state)),
			Err(Error::InvalidCallback { .. })
		));
	}

	#[test]
	fn missing_state_is_rejected() {
		let (gateway, _store, _sessions) = build_test_gateway(descriptor(), "client-1", "secret");

		assert!(matches!(
			gateway.consume_state(None),
			Err(Error::InvalidCallback { reason }) if reason.contains("missing")
		));
	}

	#[test]
	fn blank_client_id_fails_begin_authorization() {
		let (gateway, _store, _sessions) = build_test_gateway(descriptor(), " ", "secret");
		let err = gateway
			.begin_authorization()
			.expect_err("Blank client identifier should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::MissingValue { name: "client_id" })));
	}

	#[tokio::test]
	async fn provider_error_short_circuits_before_any_exchange() {
		let (gateway, _store, _sessions) = build_test_gateway(descriptor(), "client-1", "secret");
		let err = gateway
			.complete_authorization(CallbackParams {
				error: Some("access_denied".into()),
				error_description: Some("user cancelled".into()),
				..Default::default()
			})
			.await
			.expect_err("Provider denial should fail the callback.");

		assert!(matches!(err, Error::AuthorizationDenied { ref error, .. } if error == "access_denied"));
	}

	#[tokio::test]
	async fn missing_code_is_rejected() {
		let (gateway, _store, _sessions) = build_test_gateway(descriptor(), "client-1", "secret");
		let err = gateway
			.complete_authorization(CallbackParams::default())
			.await
			.expect_err("Missing code should fail the callback.");

		assert!(matches!(err, Error::MissingCode));
	}
}
