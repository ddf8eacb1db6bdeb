//! Access-token provider contract and the session-backed implementation.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, SessionObserver, TokenPair, TokenSecret},
	error::AuthError,
	http::SdkHttpClient,
	oauth::{ExchangeClient, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
	project::ProjectDescriptor,
};

/// Boxed future returned by [`AccessTokenProvider::fetch_access_token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<AccessToken>> + 'a + Send>>;

/// Asynchronous source of current access tokens.
///
/// The trait is the gate's only dependency: "get current token" either yields
/// a token usable right now or an error. Caching, refresh, and retry policy all
/// live behind this seam; the gate treats the provider as opaque.
pub trait AccessTokenProvider: Send + Sync {
	/// Yields a currently valid access token or fails.
	fn fetch_access_token(&self) -> TokenFuture<'_>;
}

/// Provider that always yields a preset token (or a preset failure).
///
/// Intended for tests and demos; the token never expires from the provider's
/// point of view.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenProvider {
	token: Option<AccessToken>,
}
impl StaticTokenProvider {
	/// Creates a provider that yields the given token.
	pub fn new(token: AccessToken) -> Self {
		Self { token: Some(token) }
	}

	/// Creates a provider yielding a one-hour token with the given secret.
	pub fn with_secret(secret: impl Into<String>) -> Self {
		Self::new(AccessToken::new(secret, OffsetDateTime::now_utc(), Duration::hours(1)))
	}

	/// Creates a provider that fails every fetch.
	pub fn failing() -> Self {
		Self { token: None }
	}
}
impl AccessTokenProvider for StaticTokenProvider {
	fn fetch_access_token(&self) -> TokenFuture<'_> {
		let token = self.token.clone();

		Box::pin(async move { token.ok_or_else(|| AuthError::TokenUnavailable.into()) })
	}
}

/// Session-backed provider that reuses fresh tokens and refreshes stale ones.
///
/// The provider owns the signed-in session's token pair behind an async mutex.
/// A fetch reuses the cached access token while it stays outside the preemptive
/// refresh window; otherwise it performs a `refresh_token` grant and rotates
/// the stored pair. A terminal rejection (revoked or invalid refresh token)
/// clears the session and notifies the observer, forcing a fresh login.
pub struct SessionTokenProvider<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	descriptor: ProjectDescriptor,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	observer: Arc<dyn SessionObserver>,
	preemptive_window: Duration,
	session: AsyncMutex<Option<TokenPair>>,
}
impl<C, M> SessionTokenProvider<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Default lead time before expiry at which tokens are refreshed early.
	pub const DEFAULT_PREEMPTIVE_WINDOW: Duration = Duration::seconds(60);

	/// Creates a provider with no installed session.
	pub fn new(
		descriptor: ProjectDescriptor,
		http_client: Arc<C>,
		transport_mapper: Arc<M>,
		observer: Arc<dyn SessionObserver>,
		preemptive_window: Duration,
	) -> Self {
		let preemptive_window =
			if preemptive_window.is_negative() { Duration::ZERO } else { preemptive_window };

		Self {
			descriptor,
			http_client,
			transport_mapper,
			observer,
			preemptive_window,
			session: AsyncMutex::new(None),
		}
	}

	/// Installs (or replaces) the session's token pair.
	pub async fn install_session(&self, pair: TokenPair) {
		*self.session.lock().await = Some(pair);
	}

	/// Clears the session, if any.
	pub async fn clear_session(&self) {
		*self.session.lock().await = None;
	}

	/// Returns `true` while a session is installed.
	pub async fn has_session(&self) -> bool {
		self.session.lock().await.is_some()
	}

	async fn reuse_or_refresh(&self) -> Result<AccessToken> {
		let mut session = self.session.lock().await;
		let Some(pair) = session.as_mut() else {
			return Err(AuthError::LoginRequired.into());
		};
		let now = OffsetDateTime::now_utc();

		if !pair.access.needs_refresh_at(now, self.preemptive_window) {
			return Ok(pair.access.clone());
		}

		let refresh_secret = pair.refresh.expose().to_owned();
		let exchange = <ExchangeClient<C, M>>::from_descriptor(
			&self.descriptor,
			self.http_client.clone(),
			self.transport_mapper.clone(),
		)?;

		match exchange.refresh_token(&refresh_secret).await {
			Ok((access, rotated_refresh)) => {
				pair.access = access.clone();
				pair.refresh = rotated_refresh
					.map(TokenSecret::new)
					.unwrap_or_else(|| TokenSecret::new(refresh_secret));

				self.observer.on_tokens_rotated();

				Ok(access)
			},
			Err(err) => {
				if matches!(err, Error::Auth(AuthError::SessionRejected { .. })) {
					*session = None;

					self.observer.on_session_invalidated();
				}

				Err(err)
			},
		}
	}
}
impl<C, M> AccessTokenProvider for SessionTokenProvider<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fetch_access_token(&self) -> TokenFuture<'_> {
		const KIND: CallKind = CallKind::TokenFetch;

		Box::pin(async move {
			let span = CallSpan::new(KIND, "fetch_access_token");

			obs::record_call_outcome(KIND, CallOutcome::Attempt);

			let result = span.instrument(self.reuse_or_refresh()).await;

			match &result {
				Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
				Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
			}

			result
		})
	}
}
impl<C, M> Debug for SessionTokenProvider<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTokenProvider")
			.field("descriptor", &self.descriptor)
			.field("preemptive_window", &self.preemptive_window)
			.finish()
	}
}
