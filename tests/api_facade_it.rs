#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use storefront_sdk::{
	_preludet::*,
	api::payments::OrderState,
	auth::{AccessToken, TokenPair, TokenSecret},
	error::{ApiError, AuthError, TransientError},
	project::{ProjectDescriptor, ProjectId, Sku},
};

const PROJECT: &str = "project-api";
const BEARER: &str = "Bearer access-fresh";

fn build_descriptor(server: &MockServer) -> ProjectDescriptor {
	let id = ProjectId::new(PROJECT).expect("Project identifier should be valid.");

	ProjectDescriptor::builder(id)
		.client_id("mobile-client")
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorize endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.api_endpoint(
			Url::parse(&server.url("/api")).expect("Mock API endpoint should parse successfully."),
		)
		.build()
		.expect("Project descriptor should build successfully.")
}

async fn signed_in_sdk(server: &MockServer) -> ReqwestTestSdk {
	let sdk = build_reqwest_test_sdk(build_descriptor(server));

	sdk.install_session(TokenPair {
		access: AccessToken::new("access-fresh", OffsetDateTime::now_utc(), Duration::hours(1)),
		refresh: TokenSecret::new("refresh-fresh"),
	})
	.await;

	sdk
}

#[tokio::test]
async fn virtual_items_attach_bearer_and_decode() {
	let server = MockServer::start_async().await;
	let sdk = signed_in_sdk(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(format!("/api/v2/project/{PROJECT}/items/virtual_items"))
				.query_param("limit", "50")
				.header("authorization", BEARER);
			then.status(200).header("content-type", "application/json").body(
				"{\"items\":[{\"sku\":\"gold-pack\",\"name\":\"Gold Pack\",\"price\":{\"amount\":\"4.99\",\"currency\":\"USD\"},\"groups\":[{\"external_id\":\"currency\",\"name\":\"Currency\"}]}],\"has_more\":false}",
			);
		})
		.await;
	let page = sdk.virtual_items().await.expect("Catalog listing should succeed.");

	mock.assert_async().await;

	assert_eq!(page.items.len(), 1);
	assert_eq!(page.items[0].sku.as_ref(), "gold-pack");
	assert_eq!(
		page.items[0].price.as_ref().map(|price| price.amount.as_str()),
		Some("4.99")
	);
	assert!(!page.has_more);
}

#[tokio::test]
async fn current_user_decodes_profile() {
	let server = MockServer::start_async().await;
	let sdk = signed_in_sdk(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/users/me").header("authorization", BEARER);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"user-7\",\"email\":\"player@example.com\"}");
		})
		.await;
	let profile = sdk.current_user().await.expect("Profile lookup should succeed.");

	mock.assert_async().await;

	assert_eq!(profile.id, "user-7");
	assert_eq!(profile.email.as_deref(), Some("player@example.com"));
	assert_eq!(profile.username, None);
}

#[tokio::test]
async fn rejected_bearer_maps_to_token_rejected() {
	let server = MockServer::start_async().await;
	let sdk = signed_in_sdk(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/api/v2/project/{PROJECT}/user/inventory/items"));
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"errorCode\":401,\"errorMessage\":\"Invalid token.\"}");
		})
		.await;
	let err = sdk.inventory_items().await.expect_err("A 401 should fail the call.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Auth(AuthError::TokenRejected)));
}

#[tokio::test]
async fn missing_order_maps_to_not_found() {
	let server = MockServer::start_async().await;
	let sdk = signed_in_sdk(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/api/v2/project/{PROJECT}/order/404404"));
			then.status(404).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = sdk.order_status(404404).await.expect_err("A 404 should fail the call.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Api(ApiError::NotFound { .. })));
}

#[tokio::test]
async fn backend_rejection_surfaces_code_and_message() {
	let server = MockServer::start_async().await;
	let sdk = signed_in_sdk(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(format!("/api/v2/project/{PROJECT}/user/inventory/item/consume"))
				.header("authorization", BEARER);
			then.status(422)
				.header("content-type", "application/json")
				.body("{\"errorCode\":4221,\"errorMessage\":\"Item is not consumable.\"}");
		})
		.await;
	let sku = Sku::new("potion").expect("SKU fixture should be valid.");
	let err =
		sdk.consume_item(&sku, Some(1), None).await.expect_err("A 422 should fail the call.");

	mock.assert_async().await;

	assert!(matches!(
		err,
		Error::Api(ApiError::Backend { status: 422, code: Some(code), message })
			if code == "4221" && message == "Item is not consumable."
	));
}

#[tokio::test]
async fn throttled_order_creation_maps_to_transient() {
	let server = MockServer::start_async().await;
	let sdk = signed_in_sdk(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(format!("/api/v2/project/{PROJECT}/payment/item/gold-pack"));
			then.status(429).header("retry-after", "30").body("slow down");
		})
		.await;
	let sku = Sku::new("gold-pack").expect("SKU fixture should be valid.");
	let err = sdk.create_order(&sku).await.expect_err("A 429 should fail the call.");

	mock.assert_async().await;

	assert!(matches!(
		err,
		Error::Transient(TransientError::Endpoint { status: 429, retry_after: Some(delay), .. })
			if delay == Duration::seconds(30)
	));
}

#[tokio::test]
async fn order_lifecycle_creates_and_polls() {
	let server = MockServer::start_async().await;
	let sdk = signed_in_sdk(&server).await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(format!("/api/v2/project/{PROJECT}/payment/item/gold-pack"))
				.header("authorization", BEARER)
				.header("content-type", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"order_id\":9001,\"token\":\"pay-token\"}");
		})
		.await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/api/v2/project/{PROJECT}/order/9001"));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"order_id\":9001,\"status\":\"done\"}");
		})
		.await;
	let sku = Sku::new("gold-pack").expect("SKU fixture should be valid.");
	let order = sdk.create_order(&sku).await.expect("Order creation should succeed.");

	create.assert_async().await;

	assert_eq!(order.order_id, 9001);
	assert_eq!(order.token, "pay-token");

	let polled = sdk.order_status(order.order_id).await.expect("Order polling should succeed.");

	status.assert_async().await;

	assert_eq!(polled.status, OrderState::Done);
}
