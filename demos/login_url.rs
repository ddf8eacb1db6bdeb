//! Demonstrates starting an Authorization Code + PKCE login and handling the
//! authorization redirect without touching the network.

// crates.io
use color_eyre::Result;
use url::Url;
// self
use storefront_sdk::{
	auth::login,
	facade::Sdk,
	project::{ProjectDescriptor, ProjectId},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let descriptor = ProjectDescriptor::builder(ProjectId::new("demo-project")?)
		.client_id("demo-client")
		.authorization_endpoint(Url::parse("https://login.example.com/oauth2/authorize")?)
		.token_endpoint(Url::parse("https://login.example.com/oauth2/token")?)
		.api_endpoint(Url::parse("https://store.example.com/api")?)
		.build()?;
	let sdk = Sdk::new(descriptor);
	let redirect_uri = Url::parse("myapp://auth/callback")?;
	let session = sdk.start_login(redirect_uri, Some("offline"));

	println!("Open this URL in the platform's web authentication surface:");
	println!("{}", session.authorize_url);

	// Simulated provider redirect; real apps receive this from the platform callback.
	let redirect = Url::parse(&format!(
		"myapp://auth/callback?code=demo-code&state={}",
		session.state
	))?;
	let parsed = login::parse_redirect(&redirect)?;

	session.validate_state(&parsed.state)?;

	println!("Extracted authorization code: {}.", parsed.code);
	println!("Next step: `sdk.complete_login(&session, &redirect)` against a live token endpoint.");

	Ok(())
}
