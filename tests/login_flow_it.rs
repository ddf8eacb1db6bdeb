#![cfg(feature = "reqwest")]

// std
use std::sync::atomic::{AtomicBool, Ordering};
// crates.io
use httpmock::prelude::*;
// self
use storefront_sdk::{
	_preludet::*,
	auth::{AccessToken, SessionObserver, TokenPair, TokenSecret},
	error::AuthError,
	project::{ProjectDescriptor, ProjectId},
};

fn build_descriptor(server: &MockServer) -> ProjectDescriptor {
	let id = ProjectId::new("project-it").expect("Project identifier should be valid.");

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

fn stale_pair(refresh: &str) -> TokenPair {
	let issued = OffsetDateTime::now_utc() - Duration::hours(2);

	TokenPair {
		access: AccessToken::new("stale-access", issued, Duration::hours(1)),
		refresh: TokenSecret::new(refresh),
	}
}

#[tokio::test]
async fn complete_login_exchanges_code_and_installs_session() {
	let server = MockServer::start_async().await;
	let sdk = build_reqwest_test_sdk(build_descriptor(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-login\",\"refresh_token\":\"refresh-login\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				);
		})
		.await;
	let redirect_uri = Url::parse("https://app.example.com/callback")
		.expect("Redirect URI fixture should parse successfully.");
	let session = sdk.start_login(redirect_uri, Some("offline"));
	let redirect = Url::parse(&format!(
		"https://app.example.com/callback?code=auth-code-1&state={}",
		session.state
	))
	.expect("Redirect fixture should parse successfully.");

	sdk.complete_login(&session, &redirect).await.expect("Code exchange should succeed.");

	mock.assert_async().await;

	assert!(sdk.is_authenticated().await);

	// The freshly installed token is reused; no refresh hits the endpoint.
	let token = sdk.access_token().await.expect("Installed session should yield a token.");

	assert_eq!(token.secret.expose(), "access-login");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn stale_session_refreshes_once_for_concurrent_callers() {
	let server = MockServer::start_async().await;
	let sdk = build_reqwest_test_sdk(build_descriptor(&server));

	sdk.install_session(stale_pair("refresh-coalesce")).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-rotated\",\"refresh_token\":\"refresh-rotated\",\"token_type\":\"bearer\",\"expires_in\":3600}",
				);
		})
		.await;
	let (first, second) = tokio::join!(sdk.access_token(), sdk.access_token());

	assert_eq!(
		first.expect("First caller should receive the rotated token.").secret.expose(),
		"access-rotated"
	);
	assert_eq!(
		second.expect("Second caller should receive the rotated token.").secret.expose(),
		"access-rotated"
	);

	mock.assert_calls_async(1).await;
	assert_eq!(sdk.gate_metrics().fetches(), 1);
	assert_eq!(sdk.gate_metrics().served(), 2);
}

#[tokio::test]
async fn rejected_refresh_clears_session_and_notifies_observer() {
	#[derive(Debug, Default)]
	struct RecordingObserver {
		invalidated: AtomicBool,
		rotated: AtomicBool,
	}
	impl SessionObserver for RecordingObserver {
		fn on_tokens_rotated(&self) {
			self.rotated.store(true, Ordering::SeqCst);
		}

		fn on_session_invalidated(&self) {
			self.invalidated.store(true, Ordering::SeqCst);
		}
	}

	let server = MockServer::start_async().await;
	let observer = Arc::new(RecordingObserver::default());
	let sdk = build_reqwest_test_sdk(build_descriptor(&server)).with_observer(observer.clone());

	sdk.install_session(stale_pair("refresh-revoked")).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;

	assert!(sdk.access_token().await.is_none(), "A rejected refresh yields no token.");

	mock.assert_async().await;

	assert!(!sdk.is_authenticated().await, "A rejected session must be cleared.");
	assert!(observer.invalidated.load(Ordering::SeqCst));
	assert!(!observer.rotated.load(Ordering::SeqCst));

	// With the session gone, the next fetch fails fast without calling the endpoint.
	assert!(sdk.access_token().await.is_none());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn redirect_errors_surface_before_any_exchange() {
	let server = MockServer::start_async().await;
	let sdk = build_reqwest_test_sdk(build_descriptor(&server));
	let redirect_uri = Url::parse("https://app.example.com/callback")
		.expect("Redirect URI fixture should parse successfully.");
	let session = sdk.start_login(redirect_uri, None);
	let denied = Url::parse(
		"https://app.example.com/callback?error=access_denied&error_description=user%20cancelled",
	)
	.expect("Denied redirect fixture should parse successfully.");
	let err = sdk
		.complete_login(&session, &denied)
		.await
		.expect_err("Provider-reported denials should surface.");

	assert!(matches!(err, Error::Auth(AuthError::RedirectDenied { .. })));
	assert!(!sdk.is_authenticated().await);
}
