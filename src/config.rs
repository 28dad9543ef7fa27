//! Environment-driven gateway configuration.
//!
//! Configuration is environment-only; [`GatewayConfig::from_lookup`] accepts an
//! injectable lookup function so tests exercise parsing without touching the
//! process environment.

// std
use std::net::SocketAddr;
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeSet},
	credential::CredentialTransport,
	error::ConfigError,
	provider::{ClientAuthMethod, ProviderDescriptor},
};

const ENV_CLIENT_ID: &str = "SEO_GATEWAY_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "SEO_GATEWAY_CLIENT_SECRET";
const ENV_REDIRECT_URI: &str = "SEO_GATEWAY_REDIRECT_URI";
const ENV_AUTHORIZE_URL: &str = "SEO_GATEWAY_AUTHORIZE_URL";
const ENV_TOKEN_URL: &str = "SEO_GATEWAY_TOKEN_URL";
const ENV_API_BASE: &str = "SEO_GATEWAY_API_BASE";
const ENV_PROVIDER_ID: &str = "SEO_GATEWAY_PROVIDER_ID";
const ENV_CLIENT_AUTH_METHOD: &str = "SEO_GATEWAY_CLIENT_AUTH_METHOD";
const ENV_SCOPES: &str = "SEO_GATEWAY_SCOPES";
const ENV_SESSION_TTL_SECS: &str = "SEO_GATEWAY_SESSION_TTL_SECS";
const ENV_UPSTREAM_TIMEOUT_SECS: &str = "SEO_GATEWAY_UPSTREAM_TIMEOUT_SECS";
const ENV_PAGE_LIMIT: &str = "SEO_GATEWAY_PAGE_LIMIT";
const ENV_CREDENTIAL_TRANSPORT: &str = "SEO_GATEWAY_CREDENTIAL_TRANSPORT";
const ENV_LISTEN: &str = "SEO_GATEWAY_LISTEN";
const ENV_ALLOWED_ORIGINS: &str = "SEO_GATEWAY_ALLOWED_ORIGINS";
const ENV_DESIGNER_LINK: &str = "SEO_GATEWAY_DESIGNER_LINK";

const DEFAULT_PROVIDER_ID: &str = "cms";
const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: i64 = 15;
const DEFAULT_PAGE_LIMIT: u32 = 100;
const DEFAULT_LISTEN: &str = "127.0.0.1:10000";

/// Validated gateway configuration assembled from `SEO_GATEWAY_*` variables.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret; required for the code exchange, not for
	/// constructing authorize URLs.
	pub client_secret: Option<String>,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Scope set requested during authorization.
	pub scope: ScopeSet,
	/// Validated provider descriptor (OAuth endpoints + data API base).
	pub descriptor: ProviderDescriptor,
	/// Lifetime of minted sessions.
	pub session_ttl: Duration,
	/// Bounded timeout applied to every upstream call.
	pub upstream_timeout: Duration,
	/// Upstream page window for listings.
	pub page_limit: u32,
	/// Credential transport applied across the HTTP surface.
	pub credential_transport: CredentialTransport,
	/// Socket address the REST surface binds to.
	pub listen: SocketAddr,
	/// Exact origins allowed by the CORS layer; empty means any origin,
	/// without credentials.
	pub allowed_origins: Vec<String>,
	/// Designer deep-link template with `{site}` and `{client_id}` placeholders.
	pub designer_link: Option<String>,
}
impl GatewayConfig {
	/// Reads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads configuration through the provided lookup function.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let client_id = require(&lookup, ENV_CLIENT_ID)?;
		let client_secret = optional(&lookup, ENV_CLIENT_SECRET);
		let redirect_uri = parse_url(&lookup, ENV_REDIRECT_URI, None)?;
		let scope = match optional(&lookup, ENV_SCOPES) {
			Some(raw) => ScopeSet::parse(&raw)?,
			None => ScopeSet::default(),
		};
		let descriptor = build_descriptor(&lookup)?;
		let session_ttl = parse_secs(&lookup, ENV_SESSION_TTL_SECS, DEFAULT_SESSION_TTL_SECS)?;
		let upstream_timeout =
			parse_secs(&lookup, ENV_UPSTREAM_TIMEOUT_SECS, DEFAULT_UPSTREAM_TIMEOUT_SECS)?;
		let page_limit = match optional(&lookup, ENV_PAGE_LIMIT) {
			Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
				name: ENV_PAGE_LIMIT,
				reason: e.to_string(),
			})?,
			None => DEFAULT_PAGE_LIMIT,
		};
		let credential_transport = match optional(&lookup, ENV_CREDENTIAL_TRANSPORT) {
			Some(raw) => raw.parse().map_err(
				|e: crate::credential::CredentialTransportParseError| ConfigError::InvalidValue {
					name: ENV_CREDENTIAL_TRANSPORT,
					reason: e.to_string(),
				},
			)?,
			None => CredentialTransport::default(),
		};
		let listen = optional(&lookup, ENV_LISTEN)
			.unwrap_or_else(|| DEFAULT_LISTEN.into())
			.parse::<SocketAddr>()
			.map_err(|e| ConfigError::InvalidValue { name: ENV_LISTEN, reason: e.to_string() })?;
		let allowed_origins = optional(&lookup, ENV_ALLOWED_ORIGINS)
			.map(|raw| {
				raw.split(',')
					.map(str::trim)
					.filter(|origin| !origin.is_empty())
					.map(str::to_owned)
					.collect()
			})
			.unwrap_or_default();
		let designer_link = optional(&lookup, ENV_DESIGNER_LINK);

		Ok(Self {
			client_id,
			client_secret,
			redirect_uri,
			scope,
			descriptor,
			session_ttl,
			upstream_timeout,
			page_limit,
			credential_transport,
			listen,
			allowed_origins,
			designer_link,
		})
	}

	/// Returns `true` when the OAuth client is fully configured for code exchanges.
	pub fn oauth_configured(&self) -> bool {
		!self.client_id.trim().is_empty() && self.client_secret.is_some()
	}

	/// Client identifier truncated for health/diagnostic output.
	pub fn masked_client_id(&self) -> String {
		let prefix: String = self.client_id.chars().take(8).collect();

		if prefix.len() < self.client_id.len() { format!("{prefix}…") } else { prefix }
	}
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Option<String> {
	lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
}

fn require(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
) -> Result<String, ConfigError> {
	optional(lookup, name).ok_or(ConfigError::MissingValue { name })
}

fn parse_url(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
	default: Option<&str>,
) -> Result<Url, ConfigError> {
	let raw = match (optional(lookup, name), default) {
		(Some(raw), _) => raw,
		(None, Some(default)) => default.to_owned(),
		(None, None) => return Err(ConfigError::MissingValue { name }),
	};

	raw.parse::<Url>()
		.map_err(|e| ConfigError::InvalidValue { name, reason: e.to_string() })
}

fn parse_secs(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &'static str,
	default: i64,
) -> Result<Duration, ConfigError> {
	let secs = match optional(lookup, name) {
		Some(raw) => raw
			.parse::<i64>()
			.map_err(|e| ConfigError::InvalidValue { name, reason: e.to_string() })?,
		None => default,
	};

	if secs <= 0 {
		return Err(ConfigError::InvalidValue { name, reason: "must be positive".into() });
	}

	Ok(Duration::seconds(secs))
}

fn build_descriptor(
	lookup: &impl Fn(&str) -> Option<String>,
) -> Result<ProviderDescriptor, ConfigError> {
	let id = optional(lookup, ENV_PROVIDER_ID).unwrap_or_else(|| DEFAULT_PROVIDER_ID.into());
	let id = ProviderId::new(&id).map_err(|e| ConfigError::InvalidValue {
		name: ENV_PROVIDER_ID,
		reason: e.to_string(),
	})?;
	let client_auth_method = match optional(lookup, ENV_CLIENT_AUTH_METHOD).as_deref() {
		None | Some("client_secret_post") => ClientAuthMethod::ClientSecretPost,
		Some("client_secret_basic") => ClientAuthMethod::ClientSecretBasic,
		Some(other) =>
			return Err(ConfigError::InvalidValue {
				name: ENV_CLIENT_AUTH_METHOD,
				reason: format!("unknown method `{other}`"),
			}),
	};

	ProviderDescriptor::builder(id)
		.authorization_endpoint(parse_url(lookup, ENV_AUTHORIZE_URL, None)?)
		.token_endpoint(parse_url(lookup, ENV_TOKEN_URL, None)?)
		.api_base(parse_url(lookup, ENV_API_BASE, None)?)
		.client_auth_method(client_auth_method)
		.build()
		.map_err(|e| ConfigError::InvalidValue { name: ENV_API_BASE, reason: e.to_string() })
}
