//! Transport primitives for token exchanges and backend API calls.
//!
//! The module exposes [`SdkHttpClient`] alongside [`ResponseMetadata`] and
//! [`ResponseMetadataSlot`] so downstream crates can integrate custom HTTP clients
//! without losing the SDK's instrumentation hooks. Token-endpoint exchanges go
//! through short-lived [`AsyncHttpClient`] handles that record status and
//! Retry-After metadata in a slot; plain JSON API calls go through
//! [`SdkHttpClient::execute`] using the crate-owned [`ApiRequest`]/[`ApiResponse`]
//! types, so implementations never leak client-specific structures.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value as JsonValue;
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// Boxed future returned by [`SdkHttpClient::execute`].
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing both of the SDK's
/// outbound request shapes: OAuth token exchanges and JSON backend API calls.
///
/// The trait acts as the SDK's only dependency on an HTTP stack. Callers provide
/// an implementation (typically behind `Arc<T>` where `T: SdkHttpClient`) and the
/// facade requests short-lived [`AsyncHttpClient`] handles that each carry a
/// clone of a [`ResponseMetadataSlot`]. Implementations must be
/// `Send + Sync + 'static` so they can be shared across facade instances, and
/// the futures they return must be `Send` so the facade's boxed futures inherit
/// the same guarantee.
pub trait SdkHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// Implementations must [`take`](ResponseMetadataSlot::take) the slot before
	/// dispatching so stale data never leaks across retries, and
	/// [`store`](ResponseMetadataSlot::store) the status and Retry-After hint as
	/// soon as a response provides them.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;

	/// Executes a JSON backend API request.
	///
	/// Non-2xx statuses are not transport errors; they resolve to an
	/// [`ApiResponse`] carrying the status and any Retry-After hint so the API
	/// layer can classify them.
	fn execute(&self, request: ApiRequest) -> ApiFuture<'_, ApiResponse>;
}

/// HTTP methods used by the SDK's backend API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiMethod {
	/// Idempotent resource read.
	Get,
	/// Resource creation or mutation with a JSON body.
	Post,
}

/// Client-agnostic description of one backend API request.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: ApiMethod,
	/// Fully-formed request URL.
	pub url: Url,
	/// Bearer token attached as the `Authorization` header, when present.
	pub bearer: Option<TokenSecret>,
	/// JSON body for POST requests.
	pub body: Option<JsonValue>,
}
impl ApiRequest {
	/// Creates a GET request for the provided URL.
	pub fn get(url: Url) -> Self {
		Self { method: ApiMethod::Get, url, bearer: None, body: None }
	}

	/// Creates a POST request for the provided URL.
	pub fn post(url: Url) -> Self {
		Self { method: ApiMethod::Post, url, bearer: None, body: None }
	}

	/// Attaches a bearer token.
	pub fn with_bearer(mut self, bearer: TokenSecret) -> Self {
		self.bearer = Some(bearer);

		self
	}

	/// Attaches a JSON body.
	pub fn with_json_body(mut self, body: JsonValue) -> Self {
		self.body = Some(body);

		self
	}
}

/// Raw backend API response surfaced to the decoding layer.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration, if supplied.
	pub retry_after: Option<Duration>,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}

/// Status and Retry-After data captured from the latest token-endpoint response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot carrying [`ResponseMetadata`] from the transport to the error mapper.
///
/// The exchange layer creates one slot per token request and reads it back as
/// soon as `oauth2` resolves, so the error mapping always sees the metadata of
/// the response that actually failed.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Default transport wrapping a [`ReqwestClient`] for both request shapes.
///
/// The same client serves token exchanges and API calls. Configure any custom
/// [`ReqwestClient`] to not follow redirects on token requests, since the SDK
/// hands this client to the `oauth2` crate when building the exchange layer.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestSdkClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestSdkClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds an instrumented HTTP client that captures response metadata.
	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestSdkClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestSdkClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
/// Instrumented adapter that implements [`AsyncHttpClient`] for reqwest.
pub(crate) struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
#[cfg(feature = "reqwest")]
impl InstrumentedHttpClient {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self { client, slot }
	}
}

#[cfg(feature = "reqwest")]
/// Public handle returned by [`ReqwestSdkClient`] that satisfies [`SdkHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient::new(client, slot)))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata {
				status: Some(status.as_u16()),
				retry_after: parse_retry_after(&headers),
			});

			let body = response.bytes().await.map_err(Box::new)?.to_vec();
			let mut rebuilt = HttpResponse::new(body);

			*rebuilt.status_mut() = status;
			*rebuilt.headers_mut() = headers;

			Ok(rebuilt)
		})
	}
}
#[cfg(feature = "reqwest")]
impl SdkHttpClient for ReqwestSdkClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		self.instrumented(slot)
	}

	fn execute(&self, request: ApiRequest) -> ApiFuture<'_, ApiResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = match request.method {
				ApiMethod::Get => client.get(request.url.clone()),
				ApiMethod::Post => client.post(request.url.clone()),
			};

			if let Some(bearer) = &request.bearer {
				builder = builder.bearer_auth(bearer.expose());
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, retry_after, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
