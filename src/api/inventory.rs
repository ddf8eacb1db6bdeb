//! Inventory surface: owned items and consumption.

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

/// Item owned by the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
	/// Stock-keeping unit.
	pub sku: Sku,
	/// Display name, when the backend includes it.
	#[serde(default)]
	pub name: Option<String>,
	/// Remaining quantity for stackable items.
	#[serde(default)]
	pub quantity: Option<u64>,
	/// Instance identifier for non-stackable items.
	#[serde(default)]
	pub instance_id: Option<String>,
}

/// The signed-in user's inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryPage {
	/// Items currently owned.
	pub items: Vec<InventoryItem>,
}

impl<C, M> Sdk<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists the signed-in user's inventory.
	pub async fn inventory_items(&self) -> Result<InventoryPage> {
		const KIND: CallKind = CallKind::Inventory;

		let span = CallSpan::new(KIND, "inventory_items");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let bearer = self.bearer().await?;
				let path = format!("v2/project/{}/user/inventory/items", self.descriptor.id);
				let url = api::api_url(&self.descriptor, &path, &[])?;

				api::execute_json(self, ApiRequest::get(url).with_bearer(bearer), &path).await
			})
			.await;

		api::record_result(KIND, &result);

		result
	}

	/// Consumes an owned item.
	///
	/// Stackable items are consumed by `quantity`; non-stackable items by
	/// `instance_id`. The unused selector is sent as `null`, matching the
	/// backend's contract.
	pub async fn consume_item(
		&self,
		sku: &Sku,
		quantity: Option<u64>,
		instance_id: Option<&str>,
	) -> Result<()> {
		const KIND: CallKind = CallKind::Inventory;

		let span = CallSpan::new(KIND, "consume_item");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let bearer = self.bearer().await?;
				let path = format!("v2/project/{}/user/inventory/item/consume", self.descriptor.id);
				let url = api::api_url(&self.descriptor, &path, &[])?;
				let body = serde_json::json!({
					"sku": sku,
					"quantity": quantity,
					"instance_id": instance_id,
				});

				api::execute_empty(
					self,
					ApiRequest::post(url).with_bearer(bearer).with_json_body(body),
					&path,
				)
				.await
			})
			.await;

		api::record_result(KIND, &result);

		result
	}
}
