//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering HTTPS-only
//! OAuth endpoints, the data API base, client authentication preference, and the scope
//! delimiter. `strategy` defines [`ProviderStrategy`], an HTTP-client-agnostic hook used
//! by the gateway to augment outgoing token requests and map responses into the gateway
//! error taxonomy.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
