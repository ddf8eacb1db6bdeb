//! Authorization Code + PKCE login session and redirect handling.
//!
//! [`LoginSession`] carries the state and PKCE secrets minted when a login
//! starts; [`parse_redirect`] extracts the authorization code from the
//! platform's callback URL (the web-authentication-session handoff), rejecting
//! provider-reported errors and missing parameters before the code exchange.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::AuthError, project::ProjectDescriptor};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods surfaced via [`LoginSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Login handshake metadata returned by [`Sdk::start_login`](crate::facade::Sdk::start_login).
#[derive(Clone)]
pub struct LoginSession {
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Redirect URI supplied when constructing the authorize URL.
	pub redirect_uri: Url,
	/// Fully-formed HTTPS authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	pkce: PkcePair,
}
impl LoginSession {
	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.pkce.challenge
	}

	/// PKCE challenge method (currently always `S256`).
	pub fn code_challenge_method(&self) -> PkceCodeChallengeMethod {
		self.pkce.method
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(AuthError::StateMismatch.into())
		}
	}

	pub(crate) fn code_verifier(&self) -> &str {
		&self.pkce.verifier
	}
}
impl Debug for LoginSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginSession")
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("authorize_url", &self.authorize_url)
			.field("code_challenge", &self.pkce.challenge)
			.field("code_challenge_method", &self.pkce.method)
			.finish()
	}
}

/// Parameters extracted from a successful authorization redirect.
#[derive(Clone, Debug)]
pub struct AuthorizationRedirect {
	/// One-time authorization code to exchange at the token endpoint.
	pub code: String,
	/// State value echoed back by the identity provider.
	pub state: String,
}

/// Extracts the authorization code and state from a callback URL.
///
/// Provider-reported errors (`error`/`error_description` query parameters) are
/// surfaced as [`AuthError::RedirectDenied`]; a redirect without a `code`
/// parameter fails with [`AuthError::MissingAuthorizationCode`], and one
/// without `state` with [`AuthError::StateMismatch`].
pub fn parse_redirect(redirect: &Url) -> Result<AuthorizationRedirect> {
	let mut code = None;
	let mut state = None;
	let mut error = None;
	let mut description = None;

	for (key, value) in redirect.query_pairs() {
		match key.as_ref() {
			"code" => code = Some(value.into_owned()),
			"state" => state = Some(value.into_owned()),
			"error" => error = Some(value.into_owned()),
			"error_description" => description = Some(value.into_owned()),
			_ => {},
		}
	}

	if let Some(error) = error {
		return Err(AuthError::RedirectDenied { error, description }.into());
	}

	let code = code.ok_or(AuthError::MissingAuthorizationCode)?;
	let state = state.ok_or(AuthError::StateMismatch)?;

	Ok(AuthorizationRedirect { code, state })
}

#[derive(Clone)]
struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

pub(crate) fn build_session(
	descriptor: &ProjectDescriptor,
	redirect_uri: Url,
	scope: Option<&str>,
) -> LoginSession {
	let state = random_string(STATE_LEN);
	let pkce = PkcePair::generate();
	let authorize_url = build_authorize_url(descriptor, &redirect_uri, scope, &state, &pkce);

	LoginSession { state, redirect_uri, authorize_url, pkce }
}

fn build_authorize_url(
	descriptor: &ProjectDescriptor,
	redirect_uri: &Url,
	scope: Option<&str>,
	state: &str,
	pkce: &PkcePair,
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", &descriptor.client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	if let Some(scope) = scope.filter(|scope| !scope.is_empty()) {
		pairs.append_pair("scope", scope);
	}

	pairs.append_pair("state", state);
	pairs.append_pair("code_challenge", &pkce.challenge);
	pairs.append_pair("code_challenge_method", pkce.method.as_str());

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}
