//! Gateway-level error types shared across the authorization flow, proxy, and stores.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider answered the authorization redirect with an error.
	#[error("Provider denied the authorization: {error}.")]
	AuthorizationDenied {
		/// Provider-supplied `error` code.
		error: String,
		/// Provider-supplied `error_description`, when present.
		description: Option<String>,
	},
	/// Callback arrived without an authorization code.
	#[error("Authorization callback is missing the code parameter.")]
	MissingCode,
	/// Callback carried a missing, unknown, expired, or reused anti-forgery state.
	#[error("Authorization callback is invalid: {reason}.")]
	InvalidCallback {
		/// Human-readable rejection reason.
		reason: String,
	},
	/// The authorized account exposes no sites the new token can act on.
	#[error("No sites are accessible to the authorized account.")]
	NoSitesFound,
	/// No live session matches the presented credential.
	#[error("No live session matches the presented credential.")]
	Unauthorized,
	/// Upstream reports the requested resource as absent.
	#[error("{resource} was not found upstream.")]
	NotFound {
		/// Label of the missing resource.
		resource: String,
	},
	/// Caller input failed validation before any upstream call was issued.
	#[error("Invalid request: {reason}.")]
	InvalidRequest {
		/// Validation failure description.
		reason: String,
	},
	/// Provider rejected the grant (e.g., bad or expired authorization code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or gateway-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or gateway-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Returns `true` when the failure is upstream unavailability worth retrying.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Error::Transient(_) | Error::Transport(_))
	}
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// A required configuration value is absent.
	#[error("Required configuration value `{name}` is missing.")]
	MissingValue {
		/// Configuration key (environment variable or builder field).
		name: &'static str,
	},
	/// A configuration value was present but failed to parse or validate.
	#[error("Configuration value `{name}` is invalid: {reason}.")]
	InvalidValue {
		/// Configuration key (environment variable or builder field).
		name: &'static str,
		/// Human-readable parse/validation failure.
		reason: String,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Session record builder validation failed.
	#[error("Unable to build session record.")]
	SessionBuild(#[from] crate::auth::SessionBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or gateway-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Data API returned a retryable failure (5xx, 429, or a timed-out request).
	#[error("Data API is unavailable: {message}.")]
	DataEndpoint {
		/// Summary of the upstream failure, body preview included when present.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Data API responded with malformed JSON that could not be parsed.
	#[error("Data API returned malformed JSON.")]
	DataResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
}
/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_gateway_error_with_source() {
		let store_error = StoreError::Backend { message: "snapshot unreadable".into() };
		let gateway_error: Error = store_error.clone().into();

		assert!(matches!(gateway_error, Error::Storage(_)));
		assert!(gateway_error.to_string().contains("snapshot unreadable"));

		let source = StdError::source(&gateway_error)
			.expect("Gateway error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn retryable_covers_transient_and_transport() {
		let transient: Error =
			TransientError::DataEndpoint { message: "503".into(), status: Some(503) }.into();
		let transport: Error =
			TransportError::Io(std::io::Error::other("connection reset")).into();

		assert!(transient.is_retryable());
		assert!(transport.is_retryable());
		assert!(!Error::Unauthorized.is_retryable());
		assert!(!Error::NoSitesFound.is_retryable());
	}
}
