//! SDK-level error types shared across the facade, auth, and API layers.

// self
use crate::_prelude::*;

/// SDK-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical SDK error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Authentication or session failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Structured failure reported by the backend API.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Authentication failures raised by the token gate, login flow, and session provider.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The access-token gate could not supply a token for the current batch.
	#[error("No access token is available for the request.")]
	TokenUnavailable,
	/// No session is installed; the caller must complete a login first.
	#[error("No session is installed; login is required.")]
	LoginRequired,
	/// The identity provider rejected the session (revoked or invalid refresh token).
	#[error("Session was rejected by the identity provider: {reason}.")]
	SessionRejected {
		/// Provider- or SDK-supplied reason string.
		reason: String,
	},
	/// The backend rejected the attached bearer token.
	#[error("Backend rejected the access token.")]
	TokenRejected,
	/// The `state` value returned by the redirect does not match the login session.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// The authorization redirect carried a provider-reported error.
	#[error("Authorization was denied: {error}.")]
	RedirectDenied {
		/// OAuth `error` query parameter from the redirect.
		error: String,
		/// OAuth `error_description` query parameter, when supplied.
		description: Option<String>,
	},
	/// The authorization redirect is missing the `code` query parameter.
	#[error("Authorization redirect is missing the code parameter.")]
	MissingAuthorizationCode,
}

/// Configuration and validation failures raised by the SDK.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Project descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint response omitted the refresh token needed to sustain the session.
	#[error("Token endpoint response is missing a refresh token.")]
	MissingRefreshToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Structured failures reported by the backend API.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Requested resource does not exist.
	#[error("Backend resource was not found: {path}.")]
	NotFound {
		/// Request path that produced the 404.
		path: String,
	},
	/// Backend rejected the request with a structured error payload.
	#[error("Backend rejected the request ({status}): {message}.")]
	Backend {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Backend-supplied error code, when present.
		code: Option<String>,
		/// Human-readable error message.
		message: String,
	},
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or SDK-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Backend API endpoint is temporarily unavailable (429/5xx).
	#[error("Backend endpoint is temporarily unavailable ({status}): {path}.")]
	Endpoint {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Request path that produced the failure.
		path: String,
	},
	/// Backend API responded with malformed JSON that could not be parsed.
	#[error("Backend returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
