//! OAuth 2.0 authorization gateway and CRUD proxy for CMS page SEO metadata—mint local
//! sessions from authorization-code exchanges, then forward page/site reads and updates with
//! derived SEO completeness attached.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod proxy;
#[cfg(feature = "rest")] pub mod rest;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		api::client::ReqwestDataApi,
		auth::ScopeSet,
		gateway::{ReqwestGateway, SessionRegistry},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
		proxy::Proxy,
		store::{MemoryStore, SessionStore},
	};

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

	/// Constructs a [`ReqwestGateway`] backed by an in-memory store, default provider strategy,
	/// and the reqwest transport used across integration tests.
	pub fn build_test_gateway(
		descriptor: ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
	) -> (ReqwestGateway, Arc<MemoryStore>, Arc<SessionRegistry>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let sessions = Arc::new(SessionRegistry::new(store, Duration::hours(24)));
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
		let http_client = test_reqwest_http_client();
		let api = Arc::new(ReqwestDataApi::from_descriptor((*http_client).clone(), &descriptor));
		let mapper = Arc::new(ReqwestTransportErrorMapper);
		let redirect_uri = Url::parse("https://app.example.com/callback")
			.expect("Test redirect URI should parse successfully.");
		let scope = ScopeSet::new(["sites:read", "pages:read", "pages:write"])
			.expect("Test scope set should be valid.");
		let gateway = ReqwestGateway::with_http_client(
			sessions.clone(),
			api,
			descriptor,
			strategy,
			client_id,
			redirect_uri,
			http_client,
			mapper,
		)
		.with_client_secret(client_secret)
		.with_scope(scope);

		(gateway, store_backend, sessions)
	}

	/// Constructs a [`Proxy`] sharing the provided registry and a reqwest-backed data API.
	pub fn build_test_proxy(descriptor: &ProviderDescriptor, sessions: Arc<SessionRegistry>) -> Proxy {
		let api = Arc::new(ReqwestDataApi::from_descriptor(
			(*test_reqwest_http_client()).clone(),
			descriptor,
		));

		Proxy::new(sessions, api)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
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
#[cfg(feature = "rest")] use {dotenvy as _, tracing_subscriber as _};
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tower as _};
