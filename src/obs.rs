//! Optional observability helpers for gateway and proxy operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `seo_gateway.op` with the `op`
//!   (operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `seo_gateway_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gateway and proxy operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Authorization URL construction (`begin_authorization`).
	Authorize,
	/// Authorization-code exchange and session mint (`complete_authorization`).
	Exchange,
	/// Out-of-band provider token verification (`verify_provider_token`).
	VerifyToken,
	/// Proxied page listing.
	ListPages,
	/// Proxied page detail fetch.
	GetPage,
	/// Proxied page SEO update.
	UpdatePageSeo,
	/// Proxied site detail fetch.
	GetSite,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Authorize => "authorize",
			OpKind::Exchange => "exchange",
			OpKind::VerifyToken => "verify_token",
			OpKind::ListPages => "list_pages",
			OpKind::GetPage => "get_page",
			OpKind::UpdatePageSeo => "update_page_seo",
			OpKind::GetSite => "get_site",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a gateway or proxy operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
