//! Reqwest-backed [`DataApi`] implementation.

// crates.io
use reqwest::{
	Method, StatusCode,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	api::{
		ApiError, ApiFuture, AuthorizedUser, DataApi, Page, PageQuery, SeoUpdate, Site,
		types::{PagesEnvelope, SitesEnvelope, UserEnvelope},
	},
	auth::{AccessToken, PageId, SiteId},
	provider::ProviderDescriptor,
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Data API client over reqwest. The caller-supplied [`ReqwestClient`] carries the
/// bounded request timeout; this type never builds its own transport.
#[derive(Clone, Debug)]
pub struct ReqwestDataApi {
	client: ReqwestClient,
	base: Url,
}
impl ReqwestDataApi {
	/// Wraps an existing client and API base URL. The base must end with `/`;
	/// descriptors normalize this during validation.
	pub fn new(client: ReqwestClient, base: Url) -> Self {
		Self { client, base }
	}

	/// Wraps an existing client using the descriptor's validated API base.
	pub fn from_descriptor(client: ReqwestClient, descriptor: &ProviderDescriptor) -> Self {
		Self::new(client, descriptor.endpoints.api_base.clone())
	}

	fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
		self.base.join(path).map_err(|source| ApiError::InvalidEndpoint { source })
	}

	async fn request<T>(
		&self,
		method: Method,
		url: Url,
		token: &AccessToken,
		body: Option<serde_json::Value>,
		resource: &str,
	) -> Result<T, ApiError>
	where
		T: serde::de::DeserializeOwned,
	{
		let mut request = self
			.client
			.request(method, url)
			.header(AUTHORIZATION, format!("Bearer {}", token.expose()))
			.header(ACCEPT, "application/json");

		if let Some(body) = body {
			let bytes = serde_json::to_vec(&body).map_err(|e| ApiError::Upstream {
				status: 0,
				body: Some(format!("failed to encode request body: {e}")),
			})?;

			request = request.header(CONTENT_TYPE, "application/json").body(bytes);
		}

		let response = request.send().await.map_err(map_send_error)?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(map_send_error)?;

		if !status.is_success() {
			return Err(classify_status(status, &bytes, resource));
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ApiError::Decode { source })
	}
}
impl DataApi for ReqwestDataApi {
	fn authorized_user<'a>(
		&'a self,
		token: &'a AccessToken,
	) -> ApiFuture<'a, Option<AuthorizedUser>> {
		Box::pin(async move {
			let url = self.endpoint("token/authorized_by")?;
			let envelope: UserEnvelope =
				self.request(Method::GET, url, token, None, "token identity").await?;

			Ok(envelope.user)
		})
	}

	fn list_sites<'a>(&'a self, token: &'a AccessToken) -> ApiFuture<'a, Vec<Site>> {
		Box::pin(async move {
			let url = self.endpoint("sites")?;
			let envelope: SitesEnvelope =
				self.request(Method::GET, url, token, None, "site collection").await?;

			Ok(envelope.sites)
		})
	}

	fn site<'a>(&'a self, token: &'a AccessToken, site: &'a SiteId) -> ApiFuture<'a, Site> {
		Box::pin(async move {
			let url = self.endpoint(&format!("sites/{site}"))?;

			self.request(Method::GET, url, token, None, &format!("site {site}")).await
		})
	}

	fn list_pages<'a>(
		&'a self,
		token: &'a AccessToken,
		site: &'a SiteId,
		query: PageQuery,
	) -> ApiFuture<'a, Vec<Page>> {
		Box::pin(async move {
			let mut url = self.endpoint(&format!("sites/{site}/pages"))?;

			url.query_pairs_mut()
				.append_pair("limit", &query.limit.to_string())
				.append_pair("offset", &query.offset.to_string());

			let envelope: PagesEnvelope =
				self.request(Method::GET, url, token, None, &format!("pages of site {site}")).await?;

			Ok(envelope.pages)
		})
	}

	fn page<'a>(&'a self, token: &'a AccessToken, page: &'a PageId) -> ApiFuture<'a, Page> {
		Box::pin(async move {
			let url = self.endpoint(&format!("pages/{page}"))?;

			self.request(Method::GET, url, token, None, &format!("page {page}")).await
		})
	}

	fn update_page_seo<'a>(
		&'a self,
		token: &'a AccessToken,
		page: &'a PageId,
		update: &'a SeoUpdate,
	) -> ApiFuture<'a, Page> {
		Box::pin(async move {
			let url = self.endpoint(&format!("pages/{page}"))?;
			let body = serde_json::json!({ "seo": update });

			self.request(Method::PATCH, url, token, Some(body), &format!("page {page}")).await
		})
	}
}

fn map_send_error(err: ReqwestError) -> ApiError {
	if err.is_timeout() {
		ApiError::Timeout
	} else {
		ApiError::Network { source: Box::new(err) }
	}
}

fn classify_status(status: StatusCode, bytes: &[u8], resource: &str) -> ApiError {
	let body = body_preview(bytes);

	match status {
		StatusCode::UNAUTHORIZED => ApiError::TokenRejected { body },
		StatusCode::NOT_FOUND => ApiError::NotFound { resource: resource.to_owned() },
		status => ApiError::Upstream { status: status.as_u16(), body },
	}
}

fn body_preview(bytes: &[u8]) -> Option<String> {
	let text = String::from_utf8_lossy(bytes);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return None;
	}

	Some(trimmed.chars().take(BODY_PREVIEW_LIMIT).collect())
}
