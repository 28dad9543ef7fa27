//! Wire types for the provider data API and the derived SEO status classification.

// self
use crate::{
	_prelude::*,
	auth::{PageId, SiteId, UserId},
};

/// Recommended SEO title length; longer titles are truncated in search results.
pub const RECOMMENDED_TITLE_LEN: usize = 60;
/// Recommended SEO description length; longer descriptions are truncated in search results.
pub const RECOMMENDED_DESCRIPTION_LEN: usize = 155;

/// Identity attached to an access token, as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedUser {
	/// Provider account identifier.
	pub id: UserId,
	/// Account email, when the provider exposes it.
	#[serde(default)]
	pub email: Option<String>,
}

/// Site metadata returned by the provider.
///
/// Only the fields the gateway interprets are typed; everything else the provider
/// returns is carried through untouched so proxied responses stay lossless.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
	/// Site identifier.
	pub id: SiteId,
	/// Short name used for designer deep links, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub short_name: Option<String>,
	/// Human-readable site name, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	/// Untyped remainder of the provider payload.
	#[serde(flatten)]
	pub rest: serde_json::Map<String, serde_json::Value>,
}

/// SEO metadata pair attached to a page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSeo {
	/// SEO title.
	#[serde(default)]
	pub title: Option<String>,
	/// SEO description.
	#[serde(default)]
	pub description: Option<String>,
}

/// Page metadata returned by the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
	/// Page identifier.
	pub id: PageId,
	/// Page title (distinct from the SEO title).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// URL slug, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub slug: Option<String>,
	/// SEO metadata pair, when present.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub seo: Option<PageSeo>,
	/// Untyped remainder of the provider payload.
	#[serde(flatten)]
	pub rest: serde_json::Map<String, serde_json::Value>,
}
impl Page {
	/// Derives the SEO completeness status from the page's current metadata.
	pub fn seo_status(&self) -> SeoStatus {
		let seo = self.seo.as_ref();

		SeoStatus::derive(
			seo.and_then(|seo| seo.title.as_deref()),
			seo.and_then(|seo| seo.description.as_deref()),
		)
	}

	/// Attaches the derived status, producing the listing representation.
	pub fn with_status(self) -> PageWithStatus {
		let seo_status = self.seo_status();

		PageWithStatus { page: self, seo_status }
	}
}

/// Listing representation: a page plus its derived SEO status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageWithStatus {
	/// The page as returned upstream.
	#[serde(flatten)]
	pub page: Page,
	/// Derived completeness classification; recomputed on every read, never persisted.
	#[serde(rename = "seoStatus")]
	pub seo_status: SeoStatus,
}

/// Derived completeness classification of a page's SEO title/description pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeoStatus {
	/// Both title and description are non-empty after trimming.
	Complete,
	/// Exactly one of title/description is non-empty after trimming.
	Partial,
	/// Neither field is non-empty after trimming.
	Missing,
}
impl SeoStatus {
	/// Computes the status from the raw field values; whitespace-only counts as empty.
	pub fn derive(title: Option<&str>, description: Option<&str>) -> Self {
		let has_title = title.is_some_and(|value| !value.trim().is_empty());
		let has_description = description.is_some_and(|value| !value.trim().is_empty());

		match (has_title, has_description) {
			(true, true) => SeoStatus::Complete,
			(false, false) => SeoStatus::Missing,
			_ => SeoStatus::Partial,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SeoStatus::Complete => "complete",
			SeoStatus::Partial => "partial",
			SeoStatus::Missing => "missing",
		}
	}
}
impl Display for SeoStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// SEO update payload; at least one field must be provided and non-blank.
///
/// Absent fields are omitted from the upstream request so the provider keeps
/// their current values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoUpdate {
	/// Replacement SEO title.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Replacement SEO description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}
impl SeoUpdate {
	/// Returns `true` when neither field carries a non-blank value.
	pub fn is_blank(&self) -> bool {
		let has_title = self.title.as_deref().is_some_and(|value| !value.trim().is_empty());
		let has_description =
			self.description.as_deref().is_some_and(|value| !value.trim().is_empty());

		!has_title && !has_description
	}
}

// Response envelopes observed on the provider's endpoints; collections default to
// empty so an absent key reads as zero records rather than a decode failure.

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
	#[serde(default)]
	pub user: Option<AuthorizedUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SitesEnvelope {
	#[serde(default)]
	pub sites: Vec<Site>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PagesEnvelope {
	#[serde(default)]
	pub pages: Vec<Page>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_derivation_covers_the_full_grid() {
		assert_eq!(SeoStatus::derive(Some("A"), Some("")), SeoStatus::Partial);
		assert_eq!(SeoStatus::derive(Some(""), Some("B")), SeoStatus::Partial);
		assert_eq!(SeoStatus::derive(Some("A"), Some("B")), SeoStatus::Complete);
		assert_eq!(SeoStatus::derive(Some(""), Some("")), SeoStatus::Missing);
		assert_eq!(SeoStatus::derive(Some("  "), Some("B")), SeoStatus::Partial);
		assert_eq!(SeoStatus::derive(None, None), SeoStatus::Missing);
	}

	#[test]
	fn page_status_reads_through_the_seo_pair() {
		let page: Page = serde_json::from_value(serde_json::json!({
			"id": "page-1",
			"title": "Home",
			"seo": { "title": "Home", "description": "Welcome" },
			"archived": false
		}))
		.expect("Page fixture should deserialize.");

		assert_eq!(page.seo_status(), SeoStatus::Complete);

		let listed = page.with_status();
		let rendered = serde_json::to_value(&listed).expect("Listing should serialize.");

		assert_eq!(rendered["seoStatus"], "complete");
		assert_eq!(rendered["archived"], false, "Untyped fields must pass through.");
	}

	#[test]
	fn pages_without_seo_read_as_missing() {
		let page: Page = serde_json::from_value(serde_json::json!({ "id": "page-2" }))
			.expect("Bare page fixture should deserialize.");

		assert_eq!(page.seo_status(), SeoStatus::Missing);
	}

	#[test]
	fn blank_updates_are_detected() {
		assert!(SeoUpdate::default().is_blank());
		assert!(SeoUpdate { title: Some("  ".into()), description: None }.is_blank());
		assert!(!SeoUpdate { title: Some("A".into()), description: None }.is_blank());
		assert!(!SeoUpdate { title: None, description: Some("B".into()) }.is_blank());
	}

	#[test]
	fn absent_update_fields_are_omitted_from_the_wire() {
		let update = SeoUpdate { title: Some("New".into()), description: None };
		let rendered = serde_json::to_value(&update).expect("Update should serialize.");

		assert_eq!(rendered, serde_json::json!({ "title": "New" }));
	}

	#[test]
	fn collection_envelopes_default_to_empty() {
		let sites: SitesEnvelope =
			serde_json::from_value(serde_json::json!({})).expect("Envelope should deserialize.");

		assert!(sites.sites.is_empty());

		let pages: PagesEnvelope =
			serde_json::from_value(serde_json::json!({})).expect("Envelope should deserialize.");

		assert!(pages.pages.is_empty());
	}
}
