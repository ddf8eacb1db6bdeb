//! Backend API surfaces exposed by the facade.
//!
//! Each submodule adds one call surface to [`Sdk`]: user profile lookups,
//! catalog reads, inventory reads and consumption, and payment orders. All of
//! them share the plumbing here: the request URL is joined onto the project's
//! API base, the bearer token is resolved through the gate first, and non-2xx
//! statuses map onto the SDK error taxonomy before any payload decoding.

pub mod inventory;
pub mod login;
pub mod payments;
pub mod store;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ApiError, AuthError, ConfigError, TransientError},
	facade::Sdk,
	http::{ApiRequest, ApiResponse, SdkHttpClient},
	oauth::TransportErrorMapper,
	obs::{self, CallKind, CallOutcome},
	project::ProjectDescriptor,
};

const ERROR_PREVIEW_LEN: usize = 256;

pub(crate) fn api_url(
	descriptor: &ProjectDescriptor,
	path: &str,
	query: &[(&str, String)],
) -> Result<Url> {
	let mut url = descriptor
		.endpoints
		.api
		.join(path)
		.map_err(|source| ConfigError::InvalidDescriptor { source })?;

	if !query.is_empty() {
		let mut pairs = url.query_pairs_mut();

		for (key, value) in query {
			pairs.append_pair(key, value);
		}

		drop(pairs);
	}

	Ok(url)
}

pub(crate) async fn execute_json<C, M, T>(
	sdk: &Sdk<C, M>,
	request: ApiRequest,
	path: &str,
) -> Result<T>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	T: DeserializeOwned,
{
	let response = sdk.http_client.execute(request).await?;

	classify_status(&response, path)?;
	decode_body(&response)
}

pub(crate) async fn execute_empty<C, M>(
	sdk: &Sdk<C, M>,
	request: ApiRequest,
	path: &str,
) -> Result<()>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let response = sdk.http_client.execute(request).await?;

	classify_status(&response, path)
}

pub(crate) fn record_result<T>(kind: CallKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
		Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
	}
}

fn classify_status(response: &ApiResponse, path: &str) -> Result<()> {
	match response.status {
		200..=299 => Ok(()),
		401 => Err(AuthError::TokenRejected.into()),
		404 => Err(ApiError::NotFound { path: path.to_owned() }.into()),
		400 | 422 => Err(backend_error(response).into()),
		status => Err(TransientError::Endpoint {
			status,
			retry_after: response.retry_after,
			path: path.to_owned(),
		}
		.into()),
	}
}

fn decode_body<T>(response: &ApiResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		TransientError::ResponseParse { source, status: Some(response.status) }.into()
	})
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
	#[serde(alias = "errorCode")]
	code: Option<serde_json::Value>,
	#[serde(alias = "errorMessage")]
	message: Option<String>,
}

fn backend_error(response: &ApiResponse) -> ApiError {
	let parsed: Option<BackendErrorBody> = serde_json::from_slice(&response.body).ok();
	let (code, message) = match parsed {
		Some(body) => {
			let code = body.code.map(|value| match value {
				serde_json::Value::String(code) => code,
				other => other.to_string(),
			});

			(code, body.message)
		},
		None => (None, None),
	};
	let message = message.unwrap_or_else(|| body_preview(&response.body));

	ApiError::Backend { status: response.status, code, message }
}

fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return "Backend returned no error details.".into();
	}

	trimmed.chars().take(ERROR_PREVIEW_LEN).collect()
}
