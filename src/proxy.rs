//! The API Proxy: authorized read/update operations forwarded to the provider's
//! data API on behalf of a resolved session.

// self
use crate::{
	_prelude::*,
	api::{ApiError, DataApi, Page, PageQuery, PageWithStatus, SeoUpdate, Site},
	auth::{PageId, Session, SiteId},
	credential::Credential,
	gateway::SessionRegistry,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Default upstream page window, matching the provider's maximum page size.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Page listing enriched with derived SEO status per record.
#[derive(Clone, Debug)]
pub struct PageListing {
	/// Site the listing was fetched for.
	pub site: SiteId,
	/// Pages with their derived status attached.
	pub pages: Vec<PageWithStatus>,
}

/// Forwards page/site operations upstream for resolved sessions, translating
/// upstream semantics into the gateway taxonomy.
///
/// Every operation resolves the caller's credential first; a missing or expired
/// session yields [`Error::Unauthorized`] without any upstream call. An upstream
/// 401 invalidates the local session before `Unauthorized` propagates, forcing
/// re-authorization instead of leaving a dead session usable.
pub struct Proxy {
	sessions: Arc<SessionRegistry>,
	api: Arc<dyn DataApi>,
	page_limit: u32,
}
impl Proxy {
	/// Creates a proxy sharing the gateway's session registry and data API handle.
	pub fn new(sessions: Arc<SessionRegistry>, api: Arc<dyn DataApi>) -> Self {
		Self { sessions, api, page_limit: DEFAULT_PAGE_LIMIT }
	}

	/// Overrides the upstream page window.
	pub fn with_page_limit(mut self, limit: u32) -> Self {
		self.page_limit = limit;

		self
	}

	/// Resolves the credential into a live session or fails with `Unauthorized`.
	pub async fn resolve_session(&self, credential: &Credential) -> Result<Session> {
		self.sessions.resolve(credential).await?.ok_or(Error::Unauthorized)
	}

	/// Lists the session's pages with derived SEO status attached to each record.
	///
	/// A site with zero pages yields an empty listing, not an error.
	pub async fn list_pages(&self, credential: &Credential) -> Result<PageListing> {
		const KIND: OpKind = OpKind::ListPages;

		let span = OpSpan::new(KIND, "list_pages");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.resolve_session(credential).await?;
				let query = PageQuery { limit: self.page_limit, offset: 0 };
				let pages = self
					.guard(
						&session,
						self.api.list_pages(&session.access_token, &session.site, query).await,
					)
					.await?;

				Ok(PageListing {
					site: session.site.clone(),
					pages: pages.into_iter().map(Page::with_status).collect(),
				})
			})
			.await;

		self.finish(KIND, result)
	}

	/// Fetches full metadata for one page.
	pub async fn get_page(&self, credential: &Credential, page: &PageId) -> Result<Page> {
		const KIND: OpKind = OpKind::GetPage;

		let span = OpSpan::new(KIND, "get_page");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.resolve_session(credential).await?;

				self.guard(&session, self.api.page(&session.access_token, page).await).await
			})
			.await;

		self.finish(KIND, result)
	}

	/// Applies an SEO metadata update to one page, returning the updated representation.
	///
	/// A blank update (both fields absent or whitespace-only) fails with
	/// [`Error::InvalidRequest`] before any upstream call is issued.
	pub async fn update_page_seo(
		&self,
		credential: &Credential,
		page: &PageId,
		update: SeoUpdate,
	) -> Result<Page> {
		const KIND: OpKind = OpKind::UpdatePageSeo;

		let span = OpSpan::new(KIND, "update_page_seo");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.resolve_session(credential).await?;

				if update.is_blank() {
					return Err(Error::InvalidRequest {
						reason: "provide a title or description to update".into(),
					});
				}

				self.guard(
					&session,
					self.api.update_page_seo(&session.access_token, page, &update).await,
				)
				.await
			})
			.await;

		self.finish(KIND, result)
	}

	/// Fetches metadata for the session's bound site.
	pub async fn get_site(&self, credential: &Credential) -> Result<Site> {
		const KIND: OpKind = OpKind::GetSite;

		let span = OpSpan::new(KIND, "get_site");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.resolve_session(credential).await?;

				self.guard(&session, self.api.site(&session.access_token, &session.site).await)
					.await
			})
			.await;

		self.finish(KIND, result)
	}

	/// Translates upstream failures, invalidating the session on token rejection.
	async fn guard<T>(&self, session: &Session, result: Result<T, ApiError>) -> Result<T> {
		match result {
			Ok(value) => Ok(value),
			Err(ApiError::TokenRejected { .. }) => {
				self.sessions.end(&session.id).await?;

				Err(Error::Unauthorized)
			},
			Err(err) => Err(err.into_error()),
		}
	}

	fn finish<T>(&self, kind: OpKind, result: Result<T>) -> Result<T> {
		match &result {
			Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(kind, OpOutcome::Failure),
		}

		result
	}
}
impl Debug for Proxy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Proxy").field("page_limit", &self.page_limit).finish()
	}
}
