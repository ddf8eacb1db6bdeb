//! Token models: redacted secrets, expiring access tokens, and session pairs.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Short-lived credential attached to authenticated backend calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
	/// Token secret; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Issued-at instant recorded from the token endpoint response.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from issued_at plus expires_in.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a token from a secret and a relative lifetime.
	pub fn new(secret: impl Into<String>, issued_at: OffsetDateTime, expires_in: Duration) -> Self {
		Self { secret: TokenSecret::new(secret), issued_at, expires_at: issued_at + expires_in }
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token should be refreshed at the provided instant.
	///
	/// A token needs a refresh once it has expired or once its remaining
	/// lifetime drops inside the preemptive `window`.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime, window: Duration) -> bool {
		if self.is_expired_at(instant) {
			return true;
		}
		if window.is_zero() || window.is_negative() {
			return false;
		}

		self.expires_at - instant <= window
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Access/refresh token pair held by an authenticated session.
#[derive(Clone, Debug)]
pub struct TokenPair {
	/// Current access token.
	pub access: AccessToken,
	/// Refresh token used to rotate the pair when the access token goes stale.
	pub refresh: TokenSecret,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn access_token_debug_redacts_secret() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = AccessToken::new("access", issued, Duration::hours(1));

		assert!(!format!("{token:?}").contains("access"));
	}

	#[test]
	fn expiry_and_refresh_windows() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = AccessToken::new("access", issued, Duration::hours(1));

		assert!(!token.is_expired_at(macros::datetime!(2025-01-01 00:30 UTC)));
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));

		let now = macros::datetime!(2025-01-01 00:30 UTC);

		assert!(!token.needs_refresh_at(now, Duration::minutes(10)));
		assert!(token.needs_refresh_at(now, Duration::minutes(30)));
		assert!(token.needs_refresh_at(macros::datetime!(2025-01-01 02:00 UTC), Duration::ZERO));
		assert!(!token.needs_refresh_at(now, Duration::ZERO));
	}
}
