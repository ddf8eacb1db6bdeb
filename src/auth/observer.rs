//! Session lifecycle hooks surfaced to the embedding application.

/// Receives session lifecycle notifications from the session token provider.
///
/// Applications typically use the hooks to persist nothing (sessions are
/// memory-only) but to drive UI state: a rotation keeps the signed-in state
/// alive, while an invalidation should route the user back to the login flow.
/// All hooks default to no-ops.
pub trait SessionObserver: Send + Sync {
	/// Called after a refresh grant rotated the session's token pair.
	fn on_tokens_rotated(&self) {}

	/// Called after the identity provider terminally rejected the session.
	///
	/// The provider has already cleared the session when this fires; the next
	/// token request will fail with a login-required error until a new login
	/// completes.
	fn on_session_invalidated(&self) {}
}

/// Default observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSessionObserver;
impl SessionObserver for NoopSessionObserver {}
