//! Catalog surface: virtual items and item groups.

// self
use crate::{
	_prelude::*,
	api,
	facade::Sdk,
	http::{ApiRequest, SdkHttpClient},
	oauth::TransportErrorMapper,
	obs::{self, CallKind, CallOutcome, CallSpan},
	project::Sku,
};

/// Price attached to a catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
	/// Decimal amount encoded as a string to avoid float rounding.
	pub amount: String,
	/// ISO 4217 currency code.
	pub currency: String,
}

/// Group a catalog item belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGroup {
	/// Stable group identifier.
	pub external_id: String,
	/// Display name for the group.
	pub name: String,
}

/// Purchasable catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualItem {
	/// Stock-keeping unit.
	pub sku: Sku,
	/// Display name.
	pub name: String,
	/// Longer description, when the project provides one.
	#[serde(default)]
	pub description: Option<String>,
	/// Price in the project's currency; absent for non-purchasable items.
	#[serde(default)]
	pub price: Option<Price>,
	/// Groups the item belongs to.
	#[serde(default)]
	pub groups: Vec<ItemGroup>,
}

/// One page of catalog items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualItemsPage {
	/// Items in this page.
	pub items: Vec<VirtualItem>,
	/// Whether more items exist beyond this page.
	#[serde(default)]
	pub has_more: bool,
}

/// Item groups defined for the project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGroupsPage {
	/// Groups in the project's catalog.
	pub groups: Vec<ItemGroup>,
}

impl<C, M> Sdk<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists the project's purchasable virtual items.
	///
	/// The page size follows the project's configured page limit.
	pub async fn virtual_items(&self) -> Result<VirtualItemsPage> {
		const KIND: CallKind = CallKind::Store;

		let span = CallSpan::new(KIND, "virtual_items");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let bearer = self.bearer().await?;
				let path = format!("v2/project/{}/items/virtual_items", self.descriptor.id);
				let url = api::api_url(&self.descriptor, &path, &[(
					"limit",
					self.descriptor.quirks.page_limit.to_string(),
				)])?;

				api::execute_json(self, ApiRequest::get(url).with_bearer(bearer), &path).await
			})
			.await;

		api::record_result(KIND, &result);

		result
	}

	/// Lists the item groups defined for the project.
	pub async fn item_groups(&self) -> Result<ItemGroupsPage> {
		const KIND: CallKind = CallKind::Store;

		let span = CallSpan::new(KIND, "item_groups");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let bearer = self.bearer().await?;
				let path = format!("v2/project/{}/items/groups", self.descriptor.id);
				let url = api::api_url(&self.descriptor, &path, &[])?;

				api::execute_json(self, ApiRequest::get(url).with_bearer(bearer), &path).await
			})
			.await;

		api::record_result(KIND, &result);

		result
	}
}
