#![cfg(feature = "reqwest")]

mod common;

// std
use std::collections::HashMap;
// crates.io
use httpmock::prelude::*;
// self
use common::*;
use seo_gateway::{
	credential::Credential,
	error::Error,
	gateway::CallbackParams,
	store::SessionStore,
};

fn callback_with(code: &str, state: &str) -> CallbackParams {
	CallbackParams {
		code: Some(code.into()),
		state: Some(state.into()),
		..Default::default()
	}
}

#[tokio::test]
async fn begin_and_complete_authorization_mints_a_session() {
	let server = MockServer::start_async().await;
	let (gateway, _proxy, sessions, store) = build_stack(build_descriptor(&server));
	let attempt = gateway.begin_authorization().expect("Authorization attempt should start.");

	assert_eq!(attempt.state.len(), 32);
	assert!(attempt.validate_state(&attempt.state).is_ok());

	let authorize_pairs: HashMap<_, _> =
		attempt.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(authorize_pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(authorize_pairs.get("client_id"), Some(&CLIENT_ID.into()));
	assert_eq!(authorize_pairs.get("redirect_uri"), Some(&REDIRECT_URI.into()));
	assert_eq!(authorize_pairs.get("scope"), Some(&"pages:read pages:write sites:read".into()));
	assert_eq!(authorize_pairs.get("state"), Some(&attempt.state));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"tok1\",\"token_type\":\"bearer\"}",
			);
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token/authorized_by");
			then.status(200).header("content-type", "application/json").body(
				"{\"user\":{\"id\":\"user-1\",\"email\":\"owner@example.com\"}}",
			);
		})
		.await;
	let sites_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/sites");
			then.status(200).header("content-type", "application/json").body(
				"{\"sites\":[{\"id\":\"s1\",\"shortName\":\"demo\"},{\"id\":\"s2\"}]}",
			);
		})
		.await;
	let session = gateway
		.complete_authorization(callback_with("abc", &attempt.state))
		.await
		.expect("Authorization callback should mint a session.");

	token_mock.assert_async().await;
	user_mock.assert_async().await;
	sites_mock.assert_async().await;

	assert_eq!(session.access_token.expose(), "tok1");
	assert_eq!(session.site.as_ref(), "s1", "The first listed site becomes the active site.");
	assert_eq!(session.site_short_name.as_deref(), Some("demo"));
	assert_eq!(session.user.as_ref().map(|user| user.as_ref()), Some("user-1"));
	assert!(session.is_active());

	let stored = store
		.fetch(&session.id)
		.await
		.expect("Session store fetch should succeed.")
		.expect("Stored session should remain present.");

	assert_eq!(stored.access_token.expose(), "tok1");

	let resolved = sessions
		.resolve(&Credential::Session(session.id.clone()))
		.await
		.expect("Resolve should succeed.")
		.expect("Freshly minted session should resolve.");

	assert_eq!(resolved.id, session.id);
}

#[tokio::test]
async fn provider_denial_never_creates_a_session() {
	let server = MockServer::start_async().await;
	let (gateway, _proxy, _sessions, store) = build_stack(build_descriptor(&server));
	let attempt = gateway.begin_authorization().expect("Authorization attempt should start.");
	let err = gateway
		.complete_authorization(CallbackParams {
			code: Some("abc".into()),
			state: Some(attempt.state.clone()),
			error: Some("access_denied".into()),
			error_description: Some("user cancelled the request".into()),
		})
		.await
		.expect_err("Provider denial should fail the callback.");

	assert!(matches!(
		err,
		Error::AuthorizationDenied { ref error, ref description }
			if error == "access_denied" && description.as_deref() == Some("user cancelled the request")
	));
	assert!(
		store
			.find_by_token("tok1")
			.await
			.expect("Store lookup should succeed.")
			.is_none(),
		"No session may exist after a denied callback.",
	);
}

#[tokio::test]
async fn empty_site_collections_fail_with_no_sites_found() {
	let server = MockServer::start_async().await;
	let (gateway, _proxy, _sessions, store) = build_stack(build_descriptor(&server));
	let attempt = gateway.begin_authorization().expect("Authorization attempt should start.");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"tok1\",\"token_type\":\"bearer\"}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token/authorized_by");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"user\":{\"id\":\"user-1\"}}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/sites");
			then.status(200).header("content-type", "application/json").body("{\"sites\":[]}");
		})
		.await;

	let err = gateway
		.complete_authorization(callback_with("abc", &attempt.state))
		.await
		.expect_err("Empty site collection should fail.");

	assert!(matches!(err, Error::NoSitesFound));
	assert!(
		store
			.find_by_token("tok1")
			.await
			.expect("Store lookup should succeed.")
			.is_none(),
		"No session may exist after a failed enrichment.",
	);
}

#[tokio::test]
async fn state_values_are_single_use() {
	let server = MockServer::start_async().await;
	let (gateway, _proxy, _sessions, _store) = build_stack(build_descriptor(&server));
	let attempt = gateway.begin_authorization().expect("Authorization attempt should start.");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"tok1\",\"token_type\":\"bearer\"}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token/authorized_by");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"user\":{\"id\":\"user-1\"}}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/sites");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"sites\":[{\"id\":\"s1\"}]}");
		})
		.await;

	gateway
		.complete_authorization(callback_with("abc", &attempt.state))
		.await
		.expect("First callback should succeed.");

	let err = gateway
		.complete_authorization(callback_with("abc", &attempt.state))
		.await
		.expect_err("Replayed state should be rejected.");

	assert!(matches!(err, Error::InvalidCallback { .. }));
}

#[tokio::test]
async fn unknown_state_is_rejected_before_the_exchange() {
	let server = MockServer::start_async().await;
	let (gateway, _proxy, _sessions, _store) = build_stack(build_descriptor(&server));
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"tok1\",\"token_type\":\"bearer\"}",
			);
		})
		.await;
	let err = gateway
		.complete_authorization(callback_with("abc", "forged-state"))
		.await
		.expect_err("Unknown state should be rejected.");

	assert!(matches!(err, Error::InvalidCallback { .. }));
	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_codes_classify_as_invalid_grant() {
	let server = MockServer::start_async().await;
	let (gateway, _proxy, _sessions, _store) = build_stack(build_descriptor(&server));
	let attempt = gateway.begin_authorization().expect("Authorization attempt should start.");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"code expired\"}",
			);
		})
		.await;

	let err = gateway
		.complete_authorization(callback_with("stale", &attempt.state))
		.await
		.expect_err("Rejected code should fail the exchange.");

	assert!(matches!(err, Error::InvalidGrant { .. }));
	assert!(err.to_string().contains("code expired"));
}

#[tokio::test]
async fn verify_provider_token_mints_a_session_for_a_live_token() {
	let server = MockServer::start_async().await;
	let (gateway, _proxy, sessions, _store) = build_stack(build_descriptor(&server));

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/token/authorized_by")
				.header("authorization", "Bearer tok-oob");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"user\":{\"id\":\"user-9\"}}");
		})
		.await;

	let site = seo_gateway::auth::SiteId::new("s9").expect("Site fixture should be valid.");
	let session = gateway
		.verify_provider_token("tok-oob", site)
		.await
		.expect("Live token should verify.");

	assert_eq!(session.site.as_ref(), "s9");

	let resolved = sessions
		.resolve(&Credential::ProviderToken("tok-oob".into()))
		.await
		.expect("Resolve should succeed.")
		.expect("Session should resolve by raw provider token.");

	assert_eq!(resolved.id, session.id);
}

#[tokio::test]
async fn verify_provider_token_rejects_dead_tokens() {
	let server = MockServer::start_async().await;
	let (gateway, _proxy, _sessions, store) = build_stack(build_descriptor(&server));

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token/authorized_by");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"message\":\"token revoked\"}");
		})
		.await;

	let site = seo_gateway::auth::SiteId::new("s9").expect("Site fixture should be valid.");
	let err = gateway
		.verify_provider_token("tok-dead", site)
		.await
		.expect_err("Dead token should be rejected.");

	assert!(matches!(err, Error::Unauthorized));
	assert!(
		store
			.find_by_token("tok-dead")
			.await
			.expect("Store lookup should succeed.")
			.is_none(),
		"No session may exist for a rejected token.",
	);
}
