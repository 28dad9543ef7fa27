//! Authorization handshake construction: anti-forgery state and authorize URLs.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, auth::ScopeSet, provider::ProviderDescriptor};

const STATE_LEN: usize = 32;

/// Authorization handshake metadata returned by
/// [`Gateway::begin_authorization`](crate::gateway::Gateway::begin_authorization).
#[derive(Clone, Debug)]
pub struct AuthorizationAttempt {
	/// Opaque anti-forgery state value that must round-trip via the callback.
	pub state: String,
	/// Redirect URI supplied when constructing the authorize URL; the token
	/// exchange must reuse it byte for byte.
	pub redirect_uri: Url,
	/// Fully-formed authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	/// Requested scope set.
	pub scope: ScopeSet,
}
impl AuthorizationAttempt {
	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::InvalidCallback { reason: "state mismatch".into() })
		}
	}
}

pub(super) fn build_attempt(
	descriptor: &ProviderDescriptor,
	client_id: &str,
	scope: &ScopeSet,
	redirect_uri: Url,
) -> AuthorizationAttempt {
	let state = random_string(STATE_LEN);
	let authorize_url = build_authorize_url(descriptor, client_id, &redirect_uri, scope, &state);

	AuthorizationAttempt { state, redirect_uri, authorize_url, scope: scope.clone() }
}

fn build_authorize_url(
	descriptor: &ProviderDescriptor,
	client_id: &str,
	redirect_uri: &Url,
	scope: &ScopeSet,
	state: &str,
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	if let Some(scope_value) = scope.joined(descriptor.scope_delimiter) {
		pairs.append_pair("scope", &scope_value);
	}

	pairs.append_pair("state", state);

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::ProviderId;

	fn descriptor() -> ProviderDescriptor {
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
	fn authorize_url_carries_the_expected_parameters() {
		let scope = ScopeSet::new(["pages:read", "sites:read"])
			.expect("Scope fixture should be valid.");
		let redirect = Url::parse("https://app.example.com/callback")
			.expect("Redirect URI should parse.");
		let attempt = build_attempt(&descriptor(), "client-1", &scope, redirect.clone());
		let pairs: HashMap<_, _> = attempt.authorize_url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("client_id"), Some(&"client-1".into()));
		assert_eq!(pairs.get("redirect_uri"), Some(&redirect.as_str().into()));
		assert_eq!(pairs.get("scope"), Some(&"pages:read sites:read".into()));
		assert_eq!(pairs.get("state"), Some(&attempt.state));
		assert_eq!(attempt.state.len(), STATE_LEN);
	}

	#[test]
	fn empty_scopes_omit_the_scope_parameter() {
		let redirect = Url::parse("https://app.example.com/callback")
			.expect("Redirect URI should parse.");
		let attempt = build_attempt(&descriptor(), "client-1", &ScopeSet::default(), redirect);
		let pairs: HashMap<_, _> = attempt.authorize_url.query_pairs().into_owned().collect();

		assert!(!pairs.contains_key("scope"));
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let redirect = Url::parse("https://app.example.com/callback")
			.expect("Redirect URI should parse.");
		let attempt = build_attempt(&descriptor(), "client-1", &ScopeSet::default(), redirect);

		assert!(attempt.validate_state(&attempt.state).is_ok());

		let err = attempt.validate_state("other").expect_err("State mismatch should fail.");

		assert!(matches!(err, Error::InvalidCallback { .. }));
	}
}
