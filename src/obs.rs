//! Optional observability helpers for SDK calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `storefront_sdk.call` with the `call`
//!   (surface) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `storefront_sdk_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// SDK call surfaces observed by the facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Login flow and user profile calls.
	Login,
	/// Catalog (virtual items, item groups) calls.
	Store,
	/// Inventory listing and consumption calls.
	Inventory,
	/// Payment order calls.
	Payments,
	/// Access-token fetches performed by the session provider.
	TokenFetch,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Login => "login",
			CallKind::Store => "store",
			CallKind::Inventory => "inventory",
			CallKind::Payments => "payments",
			CallKind::TokenFetch => "token_fetch",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an SDK call surface.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
