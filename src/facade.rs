//! Storefront facade tying the login flow, session provider, and token gate together.

// self
use crate::{
	_prelude::*,
	auth::{
		AccessToken, LoginSession, NoopSessionObserver, SessionObserver, SessionTokenProvider,
		TokenPair, TokenSecret, login,
	},
	error::AuthError,
	gate::{GateMetrics, TokenGate},
	http::SdkHttpClient,
	oauth::{ExchangeClient, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
	project::ProjectDescriptor,
};

/// Entry point for one project's storefront, identity, and payment surfaces.
///
/// The facade owns a [`SessionTokenProvider`] holding the signed-in session and
/// a [`TokenGate`] that serializes token demand from the API wrappers. Cloning
/// yields another handle onto the same session and gate, so clones can be
/// handed to concurrent tasks freely.
pub struct Sdk<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Shared HTTP transport used for token exchanges and API calls.
	pub http_client: Arc<C>,
	/// Mapper translating transport failures into SDK errors.
	pub transport_mapper: Arc<M>,
	/// Project descriptor this facade serves.
	pub descriptor: ProjectDescriptor,
	session: Arc<SessionTokenProvider<C, M>>,
	gate: TokenGate,
	observer: Arc<dyn SessionObserver>,
	preemptive_window: Duration,
}
impl<C, M> Sdk<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a facade around a custom HTTP transport and error mapper.
	pub fn with_http_client(
		descriptor: ProjectDescriptor,
		http_client: impl Into<Arc<C>>,
		transport_mapper: impl Into<Arc<M>>,
	) -> Self {
		Self::assemble(
			descriptor,
			http_client.into(),
			transport_mapper.into(),
			Arc::new(NoopSessionObserver),
			SessionTokenProvider::<C, M>::DEFAULT_PREEMPTIVE_WINDOW,
		)
	}

	/// Replaces the session observer.
	///
	/// The session provider and gate are rebuilt, dropping any installed
	/// session, so call this before logging in.
	pub fn with_observer(self, observer: Arc<dyn SessionObserver>) -> Self {
		Self::assemble(
			self.descriptor,
			self.http_client,
			self.transport_mapper,
			observer,
			self.preemptive_window,
		)
	}

	/// Overrides the preemptive refresh window.
	///
	/// The session provider and gate are rebuilt, dropping any installed
	/// session, so call this before logging in.
	pub fn with_preemptive_window(self, window: Duration) -> Self {
		Self::assemble(
			self.descriptor,
			self.http_client,
			self.transport_mapper,
			self.observer,
			window,
		)
	}

	fn assemble(
		descriptor: ProjectDescriptor,
		http_client: Arc<C>,
		transport_mapper: Arc<M>,
		observer: Arc<dyn SessionObserver>,
		preemptive_window: Duration,
	) -> Self {
		let session = Arc::new(SessionTokenProvider::new(
			descriptor.clone(),
			http_client.clone(),
			transport_mapper.clone(),
			observer.clone(),
			preemptive_window,
		));
		let gate = TokenGate::new(session.clone());

		Self { http_client, transport_mapper, descriptor, session, gate, observer, preemptive_window }
	}

	/// Starts an Authorization Code + PKCE login.
	///
	/// Returns the session carrying the authorize URL to open in the platform's
	/// web authentication surface; keep the session until the redirect lands.
	pub fn start_login(&self, redirect_uri: Url, scope: Option<&str>) -> LoginSession {
		login::build_session(&self.descriptor, redirect_uri, scope)
	}

	/// Completes a login by exchanging the redirect's authorization code.
	///
	/// Validates the redirect's `state` against the session, performs the PKCE
	/// code exchange, and installs the resulting token pair.
	pub async fn complete_login(&self, session: &LoginSession, redirect: &Url) -> Result<()> {
		const KIND: CallKind = CallKind::Login;

		let span = CallSpan::new(KIND, "complete_login");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.exchange_redirect(session, redirect)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Installs an externally obtained token pair as the current session.
	pub async fn install_session(&self, pair: TokenPair) {
		self.session.install_session(pair).await;
	}

	/// Clears the current session, if any.
	pub async fn logout(&self) {
		self.session.clear_session().await;
	}

	/// Returns `true` while a session is installed.
	pub async fn is_authenticated(&self) -> bool {
		self.session.has_session().await
	}

	/// Resolves with the current batch's access token via the gate.
	pub async fn access_token(&self) -> Option<AccessToken> {
		self.gate.access_token().await
	}

	/// Gate counters for the facade's token traffic.
	pub fn gate_metrics(&self) -> &GateMetrics {
		self.gate.metrics()
	}

	pub(crate) async fn bearer(&self) -> Result<TokenSecret> {
		self.access_token()
			.await
			.map(|token| token.secret)
			.ok_or_else(|| AuthError::TokenUnavailable.into())
	}

	async fn exchange_redirect(&self, session: &LoginSession, redirect: &Url) -> Result<()> {
		let parsed = login::parse_redirect(redirect)?;

		session.validate_state(&parsed.state)?;

		let exchange = <ExchangeClient<C, M>>::from_descriptor(
			&self.descriptor,
			self.http_client.clone(),
			self.transport_mapper.clone(),
		)?;
		let pair = exchange
			.exchange_authorization_code(
				&parsed.code,
				session.code_verifier(),
				&session.redirect_uri,
			)
			.await?;

		self.session.install_session(pair).await;

		Ok(())
	}
}
#[cfg(feature = "reqwest")]
impl Sdk<crate::http::ReqwestSdkClient, crate::oauth::ReqwestTransportErrorMapper> {
	/// Creates a facade backed by a default reqwest client.
	pub fn new(descriptor: ProjectDescriptor) -> Self {
		Self::with_http_client(
			descriptor,
			crate::http::ReqwestSdkClient::default(),
			crate::oauth::ReqwestTransportErrorMapper,
		)
	}
}
impl<C, M> Clone for Sdk<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			descriptor: self.descriptor.clone(),
			session: self.session.clone(),
			gate: self.gate.clone(),
			observer: self.observer.clone(),
			preemptive_window: self.preemptive_window,
		}
	}
}
impl<C, M> Debug for Sdk<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Sdk")
			.field("descriptor", &self.descriptor)
			.field("gate", &self.gate)
			.field("preemptive_window", &self.preemptive_window)
			.finish()
	}
}
