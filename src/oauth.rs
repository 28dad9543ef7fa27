//! Internal OAuth client facade abstractions.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::{ConfigError, TransientError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{
		ClientAuthMethod, ProviderDescriptor, ProviderErrorContext, ProviderErrorKind,
		ProviderStrategy,
	},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Access token material produced by a successful authorization-code exchange.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// The bearer access token issued by the provider.
	pub access_token: AccessToken,
	/// Relative expiry hint, when the provider supplies one. Providers in this
	/// family typically issue long-lived tokens without one; the local session
	/// TTL governs expiry either way.
	pub expires_in: Option<Duration>,
}

/// Maps HTTP transport failures into gateway [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a gateway error.
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(strategy, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(meta, message),
			_ => map_unknown_transport_error(meta),
		}
	}
}

pub(crate) trait OAuth2Facade {
	fn exchange_authorization_code<'a, 'strategy, 'code, 'redirect, 'params>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		code: &'code str,
		redirect_uri: &'redirect Url,
		extra_params: &'params [(String, String)],
	) -> FacadeFuture<'a, IssuedToken>
	where
		'strategy: 'a,
		'code: 'a,
		'redirect: 'a,
		'params: 'a;
}

pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: Option<&str>,
		redirect_uri: &Url,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		if let Some(secret) = client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
		}
		if matches!(descriptor.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self {
			oauth_client,
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}
}
impl<C, M> OAuth2Facade for BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn exchange_authorization_code<'a, 'strategy, 'code, 'redirect, 'params>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		code: &'code str,
		redirect_uri: &'redirect Url,
		extra_params: &'params [(String, String)],
	) -> FacadeFuture<'a, IssuedToken>
	where
		'strategy: 'a,
		'code: 'a,
		'redirect: 'a,
		'params: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let redirect_url = RedirectUrl::new(redirect_uri.to_string())
				.map_err(|source| ConfigError::InvalidRedirect { source })?;
			// The redirect URI must match the authorize request byte for byte; it is
			// re-set per request so callers cannot drift from the configured value.
			let mut request = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.set_redirect_uri(Cow::Owned(redirect_url));

			for (key, value) in extra_params {
				request = request.add_extra_param(key, value);
			}

			let response = request.request_async(&instrumented).await.map_err(|err| {
				map_request_error(strategy, meta.take(), err, self.error_mapper.as_ref())
			})?;
			let expires_in = response
				.expires_in()
				.map(|delta| Duration::seconds(i64::try_from(delta.as_secs()).unwrap_or(i64::MAX)));

			Ok(IssuedToken {
				access_token: AccessToken::new(response.access_token().secret().as_str()),
				expires_in,
			})
		})
	}
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, response, meta_ref),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(strategy, meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
				.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message: format!("Token endpoint returned an unexpected response: {message}."),
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let mut ctx =
		ProviderErrorContext::new().with_oauth_error(response.error().as_ref().to_string());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let classification = strategy.classify_token_error(&ctx);
	let message = if let Some(description) = response.error_description() {
		format!("Token endpoint returned an OAuth error: {description}.")
	} else {
		format!("Token endpoint returned an OAuth error: {}.", response.error().as_ref())
	};

	match classification {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		ProviderErrorKind::Transient => TransientError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(
	strategy: &dyn ProviderStrategy,
	meta: Option<&ResponseMetadata>,
	err: ReqwestError,
) -> Error {
	// Strategy reserved for future use.
	let _ = strategy;

	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::TokenEndpoint {
			message: "Request timed out while calling the token endpoint.".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(meta: Option<&ResponseMetadata>, message: impl Display) -> Error {
	TransientError::TokenEndpoint {
		message: format!("HTTP client error occurred while calling the token endpoint: {message}."),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error(meta: Option<&ResponseMetadata>) -> Error {
	TransientError::TokenEndpoint {
		message: "HTTP client error occurred while calling the token endpoint.".into(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::ProviderId,
		http::ReqwestHttpClient,
		provider::{DefaultProviderStrategy, ProviderDescriptor},
	};

	fn descriptor(method: ClientAuthMethod) -> ProviderDescriptor {
		let provider_id =
			ProviderId::new("test-cms").expect("Failed to construct provider identifier.");

		ProviderDescriptor::builder(provider_id)
			.authorization_endpoint(
				Url::parse("https://cms.example.com/oauth/authorize")
					.expect("Failed to parse authorization endpoint URL."),
			)
			.token_endpoint(
				Url::parse("https://cms.example.com/oauth/token")
					.expect("Failed to parse token endpoint URL."),
			)
			.api_base(
				Url::parse("https://api.example.com/v2")
					.expect("Failed to parse data API base URL."),
			)
			.client_auth_method(method)
			.build()
			.expect("Failed to build provider descriptor.")
	}

	fn redirect() -> Url {
		Url::parse("https://app.example.com/callback").expect("Failed to parse redirect URI.")
	}

	#[test]
	fn builds_post_auth_client() {
		let descriptor = descriptor(ClientAuthMethod::ClientSecretPost);
		let result = <BasicFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_descriptor(
			&descriptor,
			"client-id",
			Some("secret"),
			&redirect(),
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		);

		assert!(result.is_ok());
	}

	#[test]
	fn builds_basic_auth_client() {
		let descriptor = descriptor(ClientAuthMethod::ClientSecretBasic);
		let result = <BasicFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_descriptor(
			&descriptor,
			"client-id",
			Some("secret"),
			&redirect(),
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		);

		assert!(result.is_ok());
	}

	#[test]
	fn server_errors_classify_through_the_strategy() {
		let response: BasicErrorResponse = serde_json::from_value(serde_json::json!({
			"error": "invalid_grant",
			"error_description": "code expired"
		}))
		.expect("Error response fixture should deserialize.");
		let mapped = map_server_response_error(
			&DefaultProviderStrategy,
			response,
			Some(&ResponseMetadata { status: Some(400), retry_after: None }),
		);

		assert!(matches!(mapped, Error::InvalidGrant { .. }));
		assert!(mapped.to_string().contains("code expired"));
	}
}
