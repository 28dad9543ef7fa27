//! Server entry point: environment configuration, tracing, and the REST surface.

// std
use std::{error::Error as StdError, sync::Arc, time::Duration as StdDuration};
// crates.io
use tracing_subscriber::EnvFilter;
// self
use seo_gateway::{
	api::client::ReqwestDataApi,
	config::GatewayConfig,
	gateway::{ReqwestGateway, SessionRegistry},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::DefaultProviderStrategy,
	proxy::Proxy,
	rest::{self, AppState},
	store::MemoryStore,
};

const SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(600);

#[tokio::main]
async fn main() -> Result<(), Box<dyn StdError>> {
	let _ = dotenvy::dotenv();

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = GatewayConfig::from_env()?;
	let http_client = ReqwestHttpClient::with_timeout(config.upstream_timeout)?;
	let api = Arc::new(ReqwestDataApi::from_descriptor((*http_client).clone(), &config.descriptor));
	let store = Arc::new(MemoryStore::default());
	let sessions = Arc::new(SessionRegistry::new(store, config.session_ttl));
	let mut gateway = ReqwestGateway::with_http_client(
		sessions.clone(),
		api.clone(),
		config.descriptor.clone(),
		Arc::new(DefaultProviderStrategy),
		config.client_id.clone(),
		config.redirect_uri.clone(),
		http_client,
		Arc::new(ReqwestTransportErrorMapper),
	)
	.with_scope(config.scope.clone());

	if let Some(secret) = &config.client_secret {
		gateway = gateway.with_client_secret(secret);
	}

	let proxy = Proxy::new(sessions.clone(), api).with_page_limit(config.page_limit);

	spawn_session_sweeper(sessions);

	let listen = config.listen;
	let state = AppState {
		gateway: Arc::new(gateway),
		proxy: Arc::new(proxy),
		config: Arc::new(config),
	};

	tracing::info!(%listen, "seo-gateway listening");
	rest::serve(listen, rest::router(state)).await?;

	Ok(())
}

// Expiry is already evaluated lazily at resolve time; the sweeper just keeps
// abandoned sessions from accumulating in long-running processes.
fn spawn_session_sweeper(sessions: Arc<SessionRegistry>) {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(SWEEP_INTERVAL);

		ticker.tick().await;

		loop {
			ticker.tick().await;

			match sessions.sweep().await {
				Ok(0) => {},
				Ok(purged) => tracing::debug!(purged, "expired sessions swept"),
				Err(err) => tracing::warn!(%err, "session sweep failed"),
			}
		}
	});
}
