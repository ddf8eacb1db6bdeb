//! Payments surface: order creation and status polling.

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

/// Result of creating a payment order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
	/// Identifier for polling the order's status.
	pub order_id: u64,
	/// One-time token to open the payment UI with.
	pub token: String,
}

/// Lifecycle states of a payment order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
	/// Order created, payment not started.
	New,
	/// Payment captured, fulfillment pending.
	Paid,
	/// Order fulfilled.
	Done,
	/// Order canceled before fulfillment.
	Canceled,
	/// State added by the backend after this SDK release.
	#[serde(other)]
	Unknown,
}

/// Current status of a payment order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
	/// Order identifier.
	pub order_id: u64,
	/// Current lifecycle state.
	pub status: OrderState,
}

impl<C, M> Sdk<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a payment order for a single catalog item.
	///
	/// The order uses the project's default currency and sandbox setting.
	pub async fn create_order(&self, sku: &Sku) -> Result<OrderCreated> {
		const KIND: CallKind = CallKind::Payments;

		let span = CallSpan::new(KIND, "create_order");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let bearer = self.bearer().await?;
				let path = format!("v2/project/{}/payment/item/{sku}", self.descriptor.id);
				let url = api::api_url(&self.descriptor, &path, &[])?;
				let body = serde_json::json!({
					"sandbox": self.descriptor.quirks.sandbox,
					"currency": self.descriptor.quirks.default_currency,
				});

				api::execute_json(
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

	/// Polls the current status of a payment order.
	pub async fn order_status(&self, order_id: u64) -> Result<OrderStatus> {
		const KIND: CallKind = CallKind::Payments;

		let span = CallSpan::new(KIND, "order_status");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let bearer = self.bearer().await?;
				let path = format!("v2/project/{}/order/{order_id}", self.descriptor.id);
				let url = api::api_url(&self.descriptor, &path, &[])?;

				api::execute_json(self, ApiRequest::get(url).with_bearer(bearer), &path).await
			})
			.await;

		api::record_result(KIND, &result);

		result
	}
}
