//! Route handlers for the REST surface.

// crates.io
use axum::{
	Json,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Redirect, Response},
};
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	api::{PageWithStatus, SeoUpdate},
	auth::{PageId, Session, SiteId},
	credential::{Credential, CredentialTransport},
	gateway::CallbackParams,
	rest::{AppState, RestError, SESSION_COOKIE},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthSuccessResponse {
	success: bool,
	site_id: SiteId,
	#[serde(skip_serializing_if = "Option::is_none")]
	site_short_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	session_token: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VerifyTokenRequest {
	access_token: String,
	site_id: SiteId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageListResponse {
	pages: Vec<PageWithStatus>,
	total_pages: usize,
	site_id: SiteId,
}

#[derive(Debug, Serialize)]
pub(super) struct PageResponse {
	page: crate::api::Page,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdatePageResponse {
	success: bool,
	page: crate::api::Page,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdatePageRequest {
	seo: Option<SeoUpdate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SiteResponse {
	site: crate::api::Site,
	site_id: SiteId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionInfoResponse {
	has_session: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	site_id: Option<SiteId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	expires_at: Option<String>,
	timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeepLinkResponse {
	deep_link_url: String,
	site_short_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LogoutResponse {
	success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HealthResponse {
	status: &'static str,
	timestamp: String,
	oauth: OauthHealth,
	credential_transport: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OauthHealth {
	configured: bool,
	client_id: String,
	redirect_uri: String,
}

/// `GET /health`: liveness plus a masked OAuth configuration summary.
pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		timestamp: now_rfc3339(),
		oauth: OauthHealth {
			configured: state.config.oauth_configured(),
			client_id: state.config.masked_client_id(),
			redirect_uri: state.config.redirect_uri.to_string(),
		},
		credential_transport: state.config.credential_transport.as_str(),
	})
}

/// `GET /auth`: redirects the browser to the provider's authorize endpoint.
pub(super) async fn begin_auth(State(state): State<AppState>) -> Result<Redirect, RestError> {
	let attempt = state.gateway.begin_authorization()?;

	Ok(Redirect::to(attempt.authorize_url.as_str()))
}

/// `GET /callback`: completes the flow and emits the session credential.
pub(super) async fn callback(
	State(state): State<AppState>,
	Query(params): Query<CallbackParams>,
) -> Result<Response, RestError> {
	let session = state.gateway.complete_authorization(params).await?;

	Ok(auth_success_response(&state, &session))
}

/// `POST /auth/verify-token`: validates an out-of-band provider token and binds a site.
pub(super) async fn verify_token(
	State(state): State<AppState>,
	Json(request): Json<VerifyTokenRequest>,
) -> Result<Response, RestError> {
	let session = state
		.gateway
		.verify_provider_token(&request.access_token, request.site_id)
		.await?;

	Ok(auth_success_response(&state, &session))
}

/// `GET /pages`: lists the session's pages with derived SEO status.
pub(super) async fn list_pages(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<PageListResponse>, RestError> {
	let credential = extract_credential(&state, &headers)?;
	let listing = state.proxy.list_pages(&credential).await?;

	Ok(Json(PageListResponse {
		total_pages: listing.pages.len(),
		pages: listing.pages,
		site_id: listing.site,
	}))
}

/// `GET /pages/{id}`: fetches full metadata for one page.
pub(super) async fn get_page(
	State(state): State<AppState>,
	Path(id): Path<String>,
	headers: HeaderMap,
) -> Result<Json<PageResponse>, RestError> {
	let credential = extract_credential(&state, &headers)?;
	let page_id = parse_page_id(&id)?;
	let page = state.proxy.get_page(&credential, &page_id).await?;

	Ok(Json(PageResponse { page }))
}

/// `PATCH /pages/{id}`: applies an SEO metadata update.
pub(super) async fn update_page(
	State(state): State<AppState>,
	Path(id): Path<String>,
	headers: HeaderMap,
	Json(request): Json<UpdatePageRequest>,
) -> Result<Json<UpdatePageResponse>, RestError> {
	let credential = extract_credential(&state, &headers)?;
	let page_id = parse_page_id(&id)?;
	let update = request.seo.ok_or_else(|| Error::InvalidRequest {
		reason: "provide a title or description to update".into(),
	})?;
	let page = state.proxy.update_page_seo(&credential, &page_id, update).await?;

	Ok(Json(UpdatePageResponse { success: true, page }))
}

/// `GET /site`: fetches metadata for the session's bound site.
pub(super) async fn get_site(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<SiteResponse>, RestError> {
	let credential = extract_credential(&state, &headers)?;
	let site = state.proxy.get_site(&credential).await?;
	let site_id = site.id.clone();

	Ok(Json(SiteResponse { site, site_id }))
}

/// `GET /session`: non-secret session introspection; never fails with 401.
pub(super) async fn session_info(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Json<SessionInfoResponse> {
	let session = match extract_credential(&state, &headers) {
		Ok(credential) =>
			state.gateway.sessions.resolve(&credential).await.ok().flatten(),
		Err(_) => None,
	};
	let response = match session {
		Some(session) => SessionInfoResponse {
			has_session: true,
			site_id: Some(session.site),
			expires_at: session.expires_at.format(&Rfc3339).ok(),
			timestamp: now_rfc3339(),
		},
		None => SessionInfoResponse {
			has_session: false,
			site_id: None,
			expires_at: None,
			timestamp: now_rfc3339(),
		},
	};

	Json(response)
}

/// `GET /deep-link`: builds the designer deep link for the session's site.
pub(super) async fn deep_link(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<DeepLinkResponse>, RestError> {
	let template = state
		.config
		.designer_link
		.clone()
		.ok_or_else(|| Error::NotFound { resource: "designer deep link".into() })?;
	let credential = extract_credential(&state, &headers)?;
	let session = state.proxy.resolve_session(&credential).await?;
	let short_name = session
		.site_short_name
		.ok_or_else(|| Error::NotFound { resource: "site short name".into() })?;
	let deep_link_url = template
		.replace("{site}", &short_name)
		.replace("{client_id}", &state.config.client_id);

	Ok(Json(DeepLinkResponse { deep_link_url, site_short_name: short_name }))
}

/// `POST /logout`: ends the session; succeeds even without one.
pub(super) async fn logout(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Response, RestError> {
	if let Ok(credential) = extract_credential(&state, &headers)
		&& let Some(session) = state.gateway.sessions.resolve(&credential).await?
	{
		state.gateway.sessions.end(&session.id).await?;
	}

	let mut response = (StatusCode::OK, Json(LogoutResponse { success: true })).into_response();

	if matches!(state.config.credential_transport, CredentialTransport::Cookie)
		&& let Ok(value) =
			format!("{SESSION_COOKIE}=; Max-Age=0; Path=/; HttpOnly; Secure; SameSite=None")
				.parse()
	{
		response.headers_mut().append(header::SET_COOKIE, value);
	}

	Ok(response)
}

fn auth_success_response(state: &AppState, session: &Session) -> Response {
	let transport = state.config.credential_transport;
	let body = AuthSuccessResponse {
		success: true,
		site_id: session.site.clone(),
		site_short_name: session.site_short_name.clone(),
		session_token: matches!(transport, CredentialTransport::BearerSessionToken)
			.then(|| session.id.to_string()),
		access_token: matches!(transport, CredentialTransport::BearerProviderToken)
			.then(|| session.access_token.expose().to_owned()),
	};
	let mut response = (StatusCode::OK, Json(body)).into_response();

	if matches!(transport, CredentialTransport::Cookie) {
		let max_age = (session.expires_at - OffsetDateTime::now_utc()).whole_seconds().max(0);
		let cookie = format!(
			"{SESSION_COOKIE}={}; Max-Age={max_age}; Path=/; HttpOnly; Secure; SameSite=None",
			session.id
		);

		if let Ok(value) = cookie.parse() {
			response.headers_mut().append(header::SET_COOKIE, value);
		}
	}

	response
}

fn extract_credential(state: &AppState, headers: &HeaderMap) -> Result<Credential, RestError> {
	let transport = state.config.credential_transport;
	let raw = match transport {
		CredentialTransport::Cookie => cookie_value(headers, SESSION_COOKIE),
		CredentialTransport::BearerSessionToken | CredentialTransport::BearerProviderToken =>
			bearer_value(headers),
	}
	.ok_or(Error::Unauthorized)?;

	Ok(transport.interpret(&raw)?)
}

fn bearer_value(headers: &HeaderMap) -> Option<String> {
	headers
		.get(header::AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
		.map(|token| token.trim().to_owned())
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
	let raw = headers.get(header::COOKIE)?.to_str().ok()?;

	raw.split(';').map(str::trim).find_map(|pair| {
		pair.split_once('=')
			.filter(|(key, _)| *key == name)
			.map(|(_, value)| value.to_owned())
	})
}

fn parse_page_id(raw: &str) -> Result<PageId, RestError> {
	PageId::new(raw)
		.map_err(|_| RestError(Error::NotFound { resource: format!("page {raw}") }))
}

fn now_rfc3339() -> String {
	OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}
