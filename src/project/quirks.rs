// self
use crate::_prelude::*;

/// Project-specific quirks that influence how storefront calls behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectQuirks {
	/// Routes payment orders through the sandbox environment.
	pub sandbox: bool,
	/// Currency code requested when creating payment orders.
	pub default_currency: String,
	/// Page size requested when listing catalog and inventory items.
	pub page_limit: u32,
}
impl Default for ProjectQuirks {
	fn default() -> Self {
		Self { sandbox: false, default_currency: "USD".into(), page_limit: 50 }
	}
}
