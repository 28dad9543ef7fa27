//! Auth-domain identifiers, scope sets, access-token secrets, and session records.

pub mod id;
pub mod scope;
pub mod secret;
pub mod session;

pub use id::*;
pub use scope::*;
pub use secret::*;
pub use session::*;
