//! Mini-program authorization-code authenticator: exchange a one-time login code for a
//! stable `openid`, classify the provider verdict, and bind the identity to a directory
//! user without ever creating duplicates.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod directory;
pub mod error;
pub mod exchange;
pub mod flow;
pub mod http;
pub mod obs;
pub mod provider;
pub mod resolve;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		directory::{MemoryDirectory, UserDirectory},
		flow::WmpAuthenticator,
		http::ReqwestHttpClient,
		provider::ProviderDescriptor,
	};

	/// Authenticator type alias used by reqwest-backed integration tests.
	pub type ReqwestTestAuthenticator = WmpAuthenticator<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`WmpAuthenticator`] backed by an in-memory directory and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_authenticator(
		descriptor: ProviderDescriptor,
	) -> (ReqwestTestAuthenticator, Arc<MemoryDirectory>) {
		let directory_backend = Arc::new(MemoryDirectory::default());
		let directory: Arc<dyn UserDirectory> = directory_backend.clone();
		let authenticator =
			WmpAuthenticator::with_http_client(directory, descriptor, test_reqwest_http_client());

		(authenticator, directory_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
