//! Single-flight access-token gate coalescing concurrent token demand.
//!
//! Every token-dependent backend call funnels through [`TokenGate::access_token`].
//! Concurrent callers piggy-back on the same in-flight provider fetch instead of
//! stampeding the token endpoint: the first caller of a batch becomes the leader
//! and drives the fetch, while every caller (leader included) parks a waiter in a
//! FIFO queue. When the fetch resolves, the queue is drained one waiter at a
//! time, re-checking emptiness under the lock after each pop, so a waiter that
//! arrives mid-drain still rides the current batch. A failed fetch fans the
//! uniform `None` outcome out to the whole batch; callers translate it into
//! their own domain error.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use futures::channel::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccessTokenProvider},
};

/// Coalesces concurrent access-token demand into single provider fetches.
///
/// Cloning the gate yields another handle onto the same queue and in-flight
/// flag, matching how the owning facade is cloned. The gate never retries a
/// failed fetch and never times out a pending one; both policies belong to the
/// [`AccessTokenProvider`] or the caller.
#[derive(Clone)]
pub struct TokenGate(Arc<GateInner>);
impl TokenGate {
	/// Creates a gate that fetches tokens from the provided provider.
	pub fn new(provider: Arc<dyn AccessTokenProvider>) -> Self {
		Self(Arc::new(GateInner {
			provider,
			state: Mutex::new(GateState { waiters: VecDeque::new(), fetch_in_flight: false }),
			metrics: GateMetrics::default(),
		}))
	}

	/// Resolves with the current batch's access token, or `None` if the fetch failed.
	///
	/// The call enqueues a waiter and returns control to the executor
	/// immediately; at most one provider fetch is outstanding regardless of how
	/// many callers are waiting. Every caller of the same batch observes the
	/// same outcome, in FIFO enqueue order.
	pub async fn access_token(&self) -> Option<AccessToken> {
		let (sender, receiver) = oneshot::channel();
		let leads = {
			let mut state = self.0.state.lock();

			state.waiters.push_back(sender);
			self.0.metrics.record_enqueued();

			if state.fetch_in_flight {
				false
			} else {
				state.fetch_in_flight = true;

				true
			}
		};

		if leads {
			self.0.metrics.record_fetch();

			// If this future is dropped mid-fetch, the guard fails the batch
			// uniformly so no waiter is stranded.
			let guard = BatchGuard::new(&self.0);
			let outcome = self.0.provider.fetch_access_token().await.ok();

			guard.disarm();

			if outcome.is_none() {
				self.0.metrics.record_failed_batch();
			}

			self.0.drain(outcome);
		}

		receiver.await.unwrap_or(None)
	}

	/// Gate counters (fetches started, waiters enqueued/served, failed batches).
	pub fn metrics(&self) -> &GateMetrics {
		&self.0.metrics
	}
}
impl Debug for TokenGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.0.state.lock();

		f.debug_struct("TokenGate")
			.field("queued_waiters", &state.waiters.len())
			.field("fetch_in_flight", &state.fetch_in_flight)
			.finish()
	}
}

struct GateInner {
	provider: Arc<dyn AccessTokenProvider>,
	state: Mutex<GateState>,
	metrics: GateMetrics,
}
impl GateInner {
	fn drain(&self, outcome: Option<AccessToken>) {
		loop {
			let waiter = {
				let mut state = self.state.lock();

				match state.waiters.pop_front() {
					Some(waiter) => waiter,
					// The flag resets in the same critical section that
					// observes the empty queue, so no waiter can land in a gap
					// between the last pop and the reset.
					None => {
						state.fetch_in_flight = false;

						break;
					},
				}
			};

			// A waiter whose future was dropped simply discards the outcome.
			let _ = waiter.send(outcome.clone());

			self.metrics.record_served();
		}
	}
}

struct GateState {
	waiters: VecDeque<oneshot::Sender<Option<AccessToken>>>,
	fetch_in_flight: bool,
}

struct BatchGuard<'a> {
	inner: &'a GateInner,
	armed: bool,
}
impl<'a> BatchGuard<'a> {
	fn new(inner: &'a GateInner) -> Self {
		Self { inner, armed: true }
	}

	fn disarm(mut self) {
		self.armed = false;
	}
}
impl Drop for BatchGuard<'_> {
	fn drop(&mut self) {
		if self.armed {
			self.inner.metrics.record_failed_batch();
			self.inner.drain(None);
		}
	}
}

/// Thread-safe counters for gate activity.
#[derive(Debug, Default)]
pub struct GateMetrics {
	fetches: AtomicU64,
	enqueued: AtomicU64,
	served: AtomicU64,
	failed_batches: AtomicU64,
}
impl GateMetrics {
	/// Returns the total number of provider fetches started.
	pub fn fetches(&self) -> u64 {
		self.fetches.load(Ordering::Relaxed)
	}

	/// Returns the total number of waiters that entered the queue.
	pub fn enqueued(&self) -> u64 {
		self.enqueued.load(Ordering::Relaxed)
	}

	/// Returns the total number of waiters that received an outcome.
	pub fn served(&self) -> u64 {
		self.served.load(Ordering::Relaxed)
	}

	/// Returns the number of batches that drained with the failure outcome.
	pub fn failed_batches(&self) -> u64 {
		self.failed_batches.load(Ordering::Relaxed)
	}

	fn record_fetch(&self) {
		self.fetches.fetch_add(1, Ordering::Relaxed);
	}

	fn record_enqueued(&self) {
		self.enqueued.fetch_add(1, Ordering::Relaxed);
	}

	fn record_served(&self) {
		self.served.fetch_add(1, Ordering::Relaxed);
	}

	fn record_failed_batch(&self) {
		self.failed_batches.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{StaticTokenProvider, TokenFuture},
		error::AuthError,
	};

	struct CountingProvider {
		calls: AtomicU64,
		token: Option<AccessToken>,
	}
	impl CountingProvider {
		fn succeeding(secret: &str) -> Self {
			Self {
				calls: AtomicU64::new(0),
				token: Some(AccessToken::new(
					secret,
					OffsetDateTime::now_utc(),
					Duration::hours(1),
				)),
			}
		}

		fn failing() -> Self {
			Self { calls: AtomicU64::new(0), token: None }
		}
	}
	impl AccessTokenProvider for CountingProvider {
		fn fetch_access_token(&self) -> TokenFuture<'_> {
			self.calls.fetch_add(1, Ordering::Relaxed);

			let token = self.token.clone();

			Box::pin(async move { token.ok_or_else(|| AuthError::TokenUnavailable.into()) })
		}
	}

	#[tokio::test]
	async fn sequential_batches_fetch_independently() {
		let provider = Arc::new(CountingProvider::succeeding("token-a"));
		let gate = TokenGate::new(provider.clone());

		let first = gate.access_token().await.expect("First batch should yield a token.");

		assert_eq!(first.secret.expose(), "token-a");

		let second = gate.access_token().await.expect("Second batch should yield a token.");

		assert_eq!(second.secret.expose(), "token-a");
		assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
		assert_eq!(gate.metrics().fetches(), 2);
		assert_eq!(gate.metrics().served(), 2);
	}

	#[tokio::test]
	async fn failed_fetch_yields_none_and_recovers() {
		let gate = TokenGate::new(Arc::new(CountingProvider::failing()));

		assert!(gate.access_token().await.is_none());
		assert_eq!(gate.metrics().failed_batches(), 1);

		// The flag was reset, so a later call starts a fresh batch.
		assert!(gate.access_token().await.is_none());
		assert_eq!(gate.metrics().fetches(), 2);
	}

	#[tokio::test]
	async fn static_provider_feeds_the_gate() {
		let gate = TokenGate::new(Arc::new(StaticTokenProvider::with_secret("static-token")));
		let token = gate.access_token().await.expect("Static provider should yield a token.");

		assert_eq!(token.secret.expose(), "static-token");
	}
}
