//! Demonstrates listing a project’s catalog through the facade with the default
//! reqwest transport, feeding the token gate from an installed session.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use storefront_sdk::{
	auth::{AccessToken, TokenPair, TokenSecret},
	facade::Sdk,
	http::ReqwestSdkClient,
	oauth::ReqwestTransportErrorMapper,
	project::{ProjectDescriptor, ProjectId},
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let catalog_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/project/demo-project/items/virtual_items");
			then.status(200).header("content-type", "application/json").body(
				"{\"items\":[{\"sku\":\"gold-pack\",\"name\":\"Gold Pack\",\"price\":{\"amount\":\"4.99\",\"currency\":\"USD\"}}],\"has_more\":false}",
			);
		})
		.await;
	let descriptor = ProjectDescriptor::builder(ProjectId::new("demo-project")?)
		.client_id("demo-client")
		.authorization_endpoint(Url::parse(&server.url("/authorize"))?)
		.token_endpoint(Url::parse(&server.url("/token"))?)
		.api_endpoint(Url::parse(&server.url("/api"))?)
		.build()?;
	let http_client = ReqwestSdkClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let sdk = <Sdk<ReqwestSdkClient, ReqwestTransportErrorMapper>>::with_http_client(
		descriptor,
		http_client,
		ReqwestTransportErrorMapper,
	);

	sdk.install_session(TokenPair {
		access: AccessToken::new("demo-access", OffsetDateTime::now_utc(), Duration::hours(1)),
		refresh: TokenSecret::new("demo-refresh"),
	})
	.await;

	let page = sdk.virtual_items().await?;

	for item in &page.items {
		let price = item
			.price
			.as_ref()
			.map(|price| format!("{} {}", price.amount, price.currency))
			.unwrap_or_else(|| "free".into());

		println!("{}: {} ({price}).", item.sku.as_ref(), item.name);
	}

	catalog_mock.assert_async().await;

	Ok(())
}
