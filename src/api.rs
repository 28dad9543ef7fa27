//! Contracts and wire types for the provider's REST data API.
//!
//! [`DataApi`] is the proxy's only dependency on the upstream CMS: current-token
//! identity lookup, site listing/detail, page listing/detail, and page SEO updates.
//! The reqwest-backed implementation lives in [`client`]; every call runs with the
//! bounded timeout configured on the underlying HTTP client.

#[cfg(feature = "reqwest")] pub mod client;
pub mod types;

pub use types::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, PageId, SiteId},
	error::{TransientError, TransportError},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future type returned by [`DataApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + 'a + Send>>;

/// Pagination window forwarded to the provider's page listing endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageQuery {
	/// Maximum number of records to fetch.
	pub limit: u32,
	/// Zero-based offset into the collection.
	pub offset: u32,
}

/// Upstream data API contract consumed by the gateway (enrichment calls) and the proxy.
pub trait DataApi
where
	Self: Send + Sync,
{
	/// Resolves the identity behind an access token, when the provider reports one.
	fn authorized_user<'a>(
		&'a self,
		token: &'a AccessToken,
	) -> ApiFuture<'a, Option<AuthorizedUser>>;

	/// Lists the sites accessible to the token.
	fn list_sites<'a>(&'a self, token: &'a AccessToken) -> ApiFuture<'a, Vec<Site>>;

	/// Fetches metadata for one site.
	fn site<'a>(&'a self, token: &'a AccessToken, site: &'a SiteId) -> ApiFuture<'a, Site>;

	/// Lists pages under a site within the provided pagination window.
	fn list_pages<'a>(
		&'a self,
		token: &'a AccessToken,
		site: &'a SiteId,
		query: PageQuery,
	) -> ApiFuture<'a, Vec<Page>>;

	/// Fetches full metadata for one page.
	fn page<'a>(&'a self, token: &'a AccessToken, page: &'a PageId) -> ApiFuture<'a, Page>;

	/// Applies an SEO metadata update to one page, returning the updated representation.
	fn update_page_seo<'a>(
		&'a self,
		token: &'a AccessToken,
		page: &'a PageId,
		update: &'a SeoUpdate,
	) -> ApiFuture<'a, Page>;
}

/// Failures surfaced by [`DataApi`] implementations.
///
/// Upstream bodies are preserved as previews for diagnostics but never interpreted
/// as control data; classification relies on the HTTP status alone.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Upstream rejected the access token (HTTP 401); the owning session must be
	/// invalidated by the caller.
	#[error("Data API rejected the access token.")]
	TokenRejected {
		/// Body preview retained for diagnostics.
		body: Option<String>,
	},
	/// Upstream reports the resource as absent (HTTP 404).
	#[error("Data API reports {resource} as absent.")]
	NotFound {
		/// Label of the missing resource.
		resource: String,
	},
	/// Upstream returned a non-success status outside the dedicated variants.
	#[error("Data API returned status {status}.")]
	Upstream {
		/// HTTP status code.
		status: u16,
		/// Body preview retained for diagnostics.
		body: Option<String>,
	},
	/// Upstream returned JSON that could not be decoded into the expected shape.
	#[error("Data API returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// The request exceeded the configured bounded timeout.
	#[error("Data API request timed out.")]
	Timeout,
	/// Transport-level failure (DNS, TCP, TLS).
	#[error("Network error occurred while calling the data API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// A request URL could not be constructed from the descriptor's API base.
	#[error("Failed to construct a data API request URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ApiError {
	/// Maps the failure into the gateway taxonomy.
	///
	/// `TokenRejected` maps to [`Error::Unauthorized`]; callers that own a session
	/// must invalidate it before propagating (see the proxy).
	pub fn into_error(self) -> Error {
		match self {
			ApiError::TokenRejected { .. } => Error::Unauthorized,
			ApiError::NotFound { resource } => Error::NotFound { resource },
			ApiError::Upstream { status: 400, body } => Error::InvalidRequest {
				reason: body.unwrap_or_else(|| "upstream rejected the request".into()),
			},
			ApiError::Upstream { status, body } => TransientError::DataEndpoint {
				message: body.unwrap_or_else(|| format!("status {status}")),
				status: Some(status),
			}
			.into(),
			ApiError::Decode { source } => TransientError::DataResponseParse { source }.into(),
			ApiError::Timeout => TransientError::DataEndpoint {
				message: "request timed out".into(),
				status: None,
			}
			.into(),
			ApiError::Network { source } => TransportError::Network { source }.into(),
			ApiError::InvalidEndpoint { source } =>
				crate::error::ConfigError::InvalidDescriptor { source }.into(),
		}
	}
}
