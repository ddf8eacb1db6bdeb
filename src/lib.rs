//! Mobile storefront SDK—PKCE login, a single-flight token gate, and typed catalog,
//! inventory, and payment surfaces in one crate built for production clients.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod error;
pub mod facade;
pub mod gate;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod project;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		facade::Sdk, http::ReqwestSdkClient, oauth::ReqwestTransportErrorMapper,
		project::ProjectDescriptor,
	};

	/// Facade type alias used by reqwest-backed integration tests.
	pub type ReqwestTestSdk = Sdk<ReqwestSdkClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestSdkClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestSdkClient::with_client(client)
	}

	/// Constructs an [`Sdk`] over the insecure reqwest transport used across integration tests.
	pub fn build_reqwest_test_sdk(descriptor: ProjectDescriptor) -> ReqwestTestSdk {
		Sdk::with_http_client(descriptor, test_reqwest_http_client(), ReqwestTransportErrorMapper)
	}
}

mod _prelude {
	pub use std::{
		collections::VecDeque,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
#[cfg(test)] use storefront_sdk as _;
