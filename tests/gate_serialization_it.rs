// std
use std::sync::{
	Mutex,
	atomic::{AtomicU64, Ordering},
};
// crates.io
use futures::channel::oneshot;
use time::{Duration, OffsetDateTime};
// self
use storefront_sdk::{
	auth::{AccessToken, AccessTokenProvider, TokenFuture},
	error::AuthError,
	gate::TokenGate,
};

/// Provider whose fetches resolve only when the test fires the matching script
/// channel, so batch boundaries are controlled explicitly instead of with sleeps.
struct ScriptedProvider {
	calls: AtomicU64,
	scripts: Mutex<std::collections::VecDeque<oneshot::Receiver<Option<AccessToken>>>>,
}
impl ScriptedProvider {
	fn new() -> Self {
		Self { calls: AtomicU64::new(0), scripts: Mutex::new(std::collections::VecDeque::new()) }
	}

	fn script(&self) -> oneshot::Sender<Option<AccessToken>> {
		let (sender, receiver) = oneshot::channel();

		self.scripts.lock().expect("Script queue lock should not be poisoned.").push_back(receiver);

		sender
	}

	fn calls(&self) -> u64 {
		self.calls.load(Ordering::SeqCst)
	}
}
impl AccessTokenProvider for ScriptedProvider {
	fn fetch_access_token(&self) -> TokenFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let receiver = self
			.scripts
			.lock()
			.expect("Script queue lock should not be poisoned.")
			.pop_front()
			.expect("A fetch started without a script; add one with `script()` first.");

		Box::pin(async move {
			match receiver.await {
				Ok(Some(token)) => Ok(token),
				_ => Err(AuthError::TokenUnavailable.into()),
			}
		})
	}
}

fn token(secret: &str) -> AccessToken {
	AccessToken::new(secret, OffsetDateTime::now_utc(), Duration::hours(1))
}

async fn wait_until(condition: impl Fn() -> bool) {
	for _ in 0..10_000 {
		if condition() {
			return;
		}

		tokio::task::yield_now().await;
	}

	panic!("Condition was not reached while yielding to the executor.");
}

#[tokio::test]
async fn concurrent_callers_share_one_fetch() {
	let provider = std::sync::Arc::new(ScriptedProvider::new());
	let gate = TokenGate::new(provider.clone());
	let first_batch = provider.script();
	let tasks: Vec<_> = (0..3)
		.map(|_| {
			let gate = gate.clone();

			tokio::spawn(async move { gate.access_token().await })
		})
		.collect();

	wait_until(|| gate.metrics().enqueued() == 3).await;

	assert_eq!(gate.metrics().fetches(), 1, "One leader fetch should serve the whole batch.");

	first_batch.send(Some(token("abc123"))).expect("Batch outcome should be deliverable.");

	for task in tasks {
		let outcome = task.await.expect("Waiter task should not panic.");

		assert_eq!(
			outcome.expect("Every waiter should receive the batch token.").secret.expose(),
			"abc123"
		);
	}

	assert_eq!(provider.calls(), 1);
	assert_eq!(gate.metrics().served(), 3);

	// The batch is closed, so the next caller starts a fresh fetch.
	let second_batch = provider.script();

	second_batch.send(Some(token("second"))).expect("Batch outcome should be deliverable.");

	let outcome = gate.access_token().await.expect("Post-batch caller should get a fresh token.");

	assert_eq!(outcome.secret.expose(), "second");
	assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn failure_fans_out_uniformly_and_gate_recovers() {
	let provider = std::sync::Arc::new(ScriptedProvider::new());
	let gate = TokenGate::new(provider.clone());
	let failing_batch = provider.script();
	let tasks: Vec<_> = (0..2)
		.map(|_| {
			let gate = gate.clone();

			tokio::spawn(async move { gate.access_token().await })
		})
		.collect();

	wait_until(|| gate.metrics().enqueued() == 2).await;

	drop(failing_batch);

	for task in tasks {
		let outcome = task.await.expect("Waiter task should not panic.");

		assert!(outcome.is_none(), "A failed batch must resolve every waiter with no token.");
	}

	assert_eq!(provider.calls(), 1);
	assert_eq!(gate.metrics().failed_batches(), 1);

	// Failure does not wedge the gate.
	let recovery = provider.script();

	recovery.send(Some(token("recovered"))).expect("Batch outcome should be deliverable.");

	let outcome = gate.access_token().await.expect("The gate should recover after a failure.");

	assert_eq!(outcome.secret.expose(), "recovered");
	assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn waiter_arriving_mid_flight_joins_current_batch() {
	let provider = std::sync::Arc::new(ScriptedProvider::new());
	let gate = TokenGate::new(provider.clone());
	let batch = provider.script();
	let leader = {
		let gate = gate.clone();

		tokio::spawn(async move { gate.access_token().await })
	};

	wait_until(|| gate.metrics().fetches() == 1).await;

	let late = {
		let gate = gate.clone();

		tokio::spawn(async move { gate.access_token().await })
	};

	wait_until(|| gate.metrics().enqueued() == 2).await;
	batch.send(Some(token("shared"))).expect("Batch outcome should be deliverable.");

	let leader_outcome = leader.await.expect("Leader task should not panic.");
	let late_outcome = late.await.expect("Late waiter task should not panic.");

	assert_eq!(leader_outcome.expect("Leader should see the token.").secret.expose(), "shared");
	assert_eq!(late_outcome.expect("Late waiter should see the token.").secret.expose(), "shared");
	assert_eq!(provider.calls(), 1, "The late waiter must ride the in-flight fetch.");
}

#[tokio::test]
async fn cancelled_leader_fails_batch_without_stranding_waiters() {
	let provider = std::sync::Arc::new(ScriptedProvider::new());
	let gate = TokenGate::new(provider.clone());
	let _stalled_batch = provider.script();
	let leader = {
		let gate = gate.clone();

		tokio::spawn(async move { gate.access_token().await })
	};

	wait_until(|| gate.metrics().fetches() == 1).await;

	let follower = {
		let gate = gate.clone();

		tokio::spawn(async move { gate.access_token().await })
	};

	wait_until(|| gate.metrics().enqueued() == 2).await;
	leader.abort();

	let outcome = follower.await.expect("Follower task should not panic.");

	assert!(outcome.is_none(), "An aborted leader must fail its batch uniformly.");
	assert!(gate.metrics().failed_batches() >= 1);

	// The in-flight flag was released, so a new batch can proceed.
	let recovery = provider.script();

	recovery.send(Some(token("after-abort"))).expect("Batch outcome should be deliverable.");

	let outcome =
		gate.access_token().await.expect("A new batch should succeed after leader cancellation.");

	assert_eq!(outcome.secret.expose(), "after-abort");
	assert_eq!(provider.calls(), 2);
}
