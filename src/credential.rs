//! Credential transport capability and request credential values.
//!
//! The source deployments forked the whole gateway per credential style (cookie
//! session, bearer session token, raw provider token). Here the style is one
//! configured capability; every endpoint applies the selected transport
//! consistently.

// self
use crate::{_prelude::*, auth::SessionId};

/// How callers present their session credential on proxied requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialTransport {
	#[default]
	/// HTTP cookie carrying the session identifier.
	Cookie,
	/// `Authorization: Bearer` header carrying the session identifier.
	BearerSessionToken,
	/// `Authorization: Bearer` header carrying the raw provider access token.
	BearerProviderToken,
}
impl CredentialTransport {
	/// Returns a stable label matching the configuration syntax.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialTransport::Cookie => "cookie",
			CredentialTransport::BearerSessionToken => "bearer-session-token",
			CredentialTransport::BearerProviderToken => "bearer-provider-token",
		}
	}

	/// Returns `true` when the credential travels in the `Authorization` header.
	pub const fn is_bearer(self) -> bool {
		!matches!(self, CredentialTransport::Cookie)
	}

	/// Interprets the raw credential string extracted from a request.
	///
	/// Malformed values resolve to [`Error::Unauthorized`]; the transport layer
	/// treats them the same as an absent credential.
	pub fn interpret(self, raw: &str) -> Result<Credential> {
		let raw = raw.trim();

		if raw.is_empty() {
			return Err(Error::Unauthorized);
		}

		match self {
			CredentialTransport::Cookie | CredentialTransport::BearerSessionToken =>
				SessionId::new(raw).map(Credential::Session).map_err(|_| Error::Unauthorized),
			CredentialTransport::BearerProviderToken =>
				Ok(Credential::ProviderToken(raw.to_owned())),
		}
	}
}
impl Display for CredentialTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for CredentialTransport {
	type Err = CredentialTransportParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"cookie" => Ok(CredentialTransport::Cookie),
			"bearer-session-token" => Ok(CredentialTransport::BearerSessionToken),
			"bearer-provider-token" => Ok(CredentialTransport::BearerProviderToken),
			_ => Err(CredentialTransportParseError { value: s.to_owned() }),
		}
	}
}

/// Error returned when parsing a credential transport label fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error(
	"Unknown credential transport `{value}`; expected cookie, bearer-session-token, or bearer-provider-token."
)]
pub struct CredentialTransportParseError {
	/// The unrecognized label.
	pub value: String,
}

/// Request credential resolved from the configured transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
	/// Session identifier minted by the gateway.
	Session(SessionId),
	/// Raw provider access token presented by the caller.
	ProviderToken(String),
}
