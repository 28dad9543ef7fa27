//! Axum-backed HTTP surface exposing the gateway and proxy operations.
//!
//! The routes mirror the minimal contract consumed by design-surface extensions:
//! `/auth`, `/callback`, `/auth/verify-token`, `/pages`, `/pages/{id}`, `/site`,
//! `/session`, `/deep-link`, `/logout`, and `/health`. Responses are JSON; the
//! session credential travels per the configured [`CredentialTransport`].

pub mod handlers;

// std
use std::net::SocketAddr;
// crates.io
use axum::{
	Json, Router,
	http::{HeaderValue, Method, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};
// self
use crate::{
	_prelude::*, config::GatewayConfig, error::TransportError, gateway::ReqwestGateway,
	proxy::Proxy,
};

/// Cookie name used by the cookie credential transport.
pub const SESSION_COOKIE: &str = "seo_gateway_session";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	/// Authorization gateway (reqwest-backed stack).
	pub gateway: Arc<ReqwestGateway>,
	/// API proxy sharing the gateway's session registry.
	pub proxy: Arc<Proxy>,
	/// Validated configuration, consulted for transports/health/deep links.
	pub config: Arc<GatewayConfig>,
}

/// Builds the service router with trace and CORS layers applied.
pub fn router(state: AppState) -> Router {
	let cors = cors_layer(&state.config);

	Router::new()
		.route("/health", get(handlers::health))
		.route("/auth", get(handlers::begin_auth))
		.route("/auth/verify-token", post(handlers::verify_token))
		.route("/callback", get(handlers::callback))
		.route("/pages", get(handlers::list_pages))
		.route("/pages/{id}", get(handlers::get_page).patch(handlers::update_page))
		.route("/site", get(handlers::get_site))
		.route("/session", get(handlers::session_info))
		.route("/deep-link", get(handlers::deep_link))
		.route("/logout", post(handlers::logout))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(cors)
}

/// Binds the listener and serves the router until interrupted.
pub async fn serve(listen: SocketAddr, app: Router) -> Result<()> {
	let listener = tokio::net::TcpListener::bind(listen).await.map_err(TransportError::Io)?;

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(TransportError::Io)?;

	Ok(())
}

async fn shutdown_signal() {
	let _ = tokio::signal::ctrl_c().await;
}

// With no configured origins the layer stays permissive but credential-less;
// exact origins are required before cookies are allowed cross-site.
fn cors_layer(config: &GatewayConfig) -> CorsLayer {
	if config.allowed_origins.is_empty() {
		return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
	}

	let origins: Vec<HeaderValue> = config
		.allowed_origins
		.iter()
		.filter_map(|origin| origin.parse::<HeaderValue>().ok())
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
		.allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
		.allow_credentials(true)
}

/// JSON error body returned by every failing route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
	/// Stable machine-readable error label.
	pub error: &'static str,
	/// Human-readable message.
	pub message: String,
	/// Re-authorization entry point, present on `unauthorized` responses.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub authorize_url: Option<&'static str>,
	/// Upstream diagnostics preserved verbatim, when available.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<String>,
}

/// Wrapper mapping gateway errors onto HTTP responses.
#[derive(Debug)]
pub struct RestError(pub Error);
impl From<Error> for RestError {
	fn from(err: Error) -> Self {
		Self(err)
	}
}
impl IntoResponse for RestError {
	fn into_response(self) -> Response {
		let message = self.0.to_string();
		let (status, label, authorize_url, details) = match &self.0 {
			Error::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", Some("/auth"), None),
			Error::AuthorizationDenied { description, .. } => (
				StatusCode::UNAUTHORIZED,
				"authorization_denied",
				Some("/auth"),
				description.clone(),
			),
			Error::InvalidGrant { .. } | Error::InvalidClient { .. } =>
				(StatusCode::UNAUTHORIZED, "authorization_failed", Some("/auth"), None),
			Error::MissingCode =>
				(StatusCode::BAD_REQUEST, "missing_code", None, None),
			Error::InvalidCallback { .. } =>
				(StatusCode::BAD_REQUEST, "invalid_callback", None, None),
			Error::InvalidRequest { .. } =>
				(StatusCode::BAD_REQUEST, "invalid_request", None, None),
			Error::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found", None, None),
			Error::NoSitesFound =>
				(StatusCode::UNPROCESSABLE_ENTITY, "no_sites_found", None, None),
			Error::Transient(_) | Error::Transport(_) =>
				(StatusCode::BAD_GATEWAY, "upstream_unavailable", None, None),
			Error::Storage(_) | Error::Config(_) =>
				(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None, None),
		};
		let body = ErrorBody { error: label, message, authorize_url, details };

		(status, Json(body)).into_response()
	}
}
