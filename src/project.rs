//! Project descriptor data structures and helpers shared by the facade.
//!
//! The module exposes validated project metadata (identifiers, secure
//! endpoints, storefront quirks) plus the builder used to assemble it, so the
//! facade and API surfaces can rely on invariants instead of re-checking URLs.

/// Builder API for assembling project descriptors.
pub mod builder;
/// Strongly typed project identifiers.
pub mod id;
/// Project-specific storefront quirks.
pub mod quirks;

pub use builder::*;
pub use id::*;
pub use quirks::*;

// self
use crate::_prelude::*;

/// Endpoint set declared by a project descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEndpoints {
	/// Authorization endpoint used by the login flow.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token: Url,
	/// Base URL for backend API calls (catalog, inventory, payments).
	pub api: Url,
}

/// Immutable project descriptor consumed by the facade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
	/// Project identifier.
	pub id: ProjectId,
	/// OAuth 2.0 client identifier used for login and refresh grants.
	pub client_id: String,
	/// Endpoint definitions exposed by the backend.
	pub endpoints: ProjectEndpoints,
	/// Project-specific quirks.
	pub quirks: ProjectQuirks,
}
impl ProjectDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProjectId) -> ProjectDescriptorBuilder {
		ProjectDescriptorBuilder::new(id)
	}
}
