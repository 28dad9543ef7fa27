//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
// self
use seo_gateway::{
	api::client::ReqwestDataApi,
	auth::{ProviderId, ScopeSet},
	gateway::{ReqwestGateway, SessionRegistry},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
	proxy::Proxy,
	reqwest::Client as ReqwestClient,
	store::{MemoryStore, SessionStore},
	url::Url,
};
use time::Duration;

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const REDIRECT_URI: &str = "https://app.example.com/callback";

/// Builds a reqwest client that accepts the self-signed certificates produced by
/// `httpmock`.
pub fn insecure_client() -> ReqwestClient {
	ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.")
}

pub fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id =
		ProviderId::new("mock-cms").expect("Provider identifier should be valid for tests.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorization endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.api_base(
			Url::parse(&server.url("/api")).expect("Mock API base should parse successfully."),
		)
		.build()
		.expect("Provider descriptor should build successfully.")
}

/// Constructs a gateway + proxy pair over the mock server, sharing one in-memory
/// store and registry.
pub fn build_stack(
	descriptor: ProviderDescriptor,
) -> (ReqwestGateway, Proxy, Arc<SessionRegistry>, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn SessionStore> = store_backend.clone();
	let sessions = Arc::new(SessionRegistry::new(store, Duration::hours(24)));
	let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
	let http_client = ReqwestHttpClient::with_client(insecure_client());
	let api = Arc::new(ReqwestDataApi::from_descriptor(insecure_client(), &descriptor));
	let redirect_uri =
		Url::parse(REDIRECT_URI).expect("Redirect URI fixture should parse successfully.");
	let scope = ScopeSet::new(["pages:read", "pages:write", "sites:read"])
		.expect("Scope fixture should be valid.");
	let gateway = ReqwestGateway::with_http_client(
		sessions.clone(),
		api.clone(),
		descriptor,
		strategy,
		CLIENT_ID,
		redirect_uri,
		http_client,
		Arc::new(ReqwestTransportErrorMapper),
	)
	.with_client_secret(CLIENT_SECRET)
	.with_scope(scope);
	let proxy = Proxy::new(sessions.clone(), api);

	(gateway, proxy, sessions, store_backend)
}
