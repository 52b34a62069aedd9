//! Signed OAuth 1.0a single-sign-on handshakes: request tokens, login redirects, and verifier
//! exchanges with HMAC-SHA1 or RSA-SHA1 signing behind one small session type.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod decode;
pub mod error;
pub mod http;
pub mod obs;
pub mod provider;
pub mod session;
pub mod sign;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{collections::VecDeque, sync::Mutex};
	// self
	use crate::{
		auth::Consumer,
		error::TransportError,
		http::{SsoTransport, TransportFuture},
		provider::SsoDescriptor,
		session::HandshakeSession,
	};

	/// Base URL used by offline fixtures.
	pub const TEST_BASE: &str = "https://sso.example.com";
	/// Consumer key used by offline fixtures.
	pub const TEST_CONSUMER_KEY: &str = "abc";
	/// Consumer secret used by offline fixtures.
	pub const TEST_CONSUMER_SECRET: &str = "shh";

	/// Request captured by [`StubTransport`].
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct RecordedPost {
		/// Target URL.
		pub url: String,
		/// Form-encoded body.
		pub body: String,
	}
	impl RecordedPost {
		/// Decodes the body into key/value pairs.
		pub fn form(&self) -> HashMap<String, String> {
			url::form_urlencoded::parse(self.body.as_bytes()).into_owned().collect()
		}
	}

	/// Scripted transport that replays queued replies and records every request.
	///
	/// An exhausted script answers with [`TransportError::EmptyBody`].
	#[derive(Clone, Debug, Default)]
	pub struct StubTransport {
		replies: Arc<Mutex<VecDeque<Result<String, u16>>>>,
		posts: Arc<Mutex<Vec<RecordedPost>>>,
	}
	impl StubTransport {
		/// Queues a successful body.
		pub fn reply(self, body: impl Into<String>) -> Self {
			self.lock_replies().push_back(Ok(body.into()));

			self
		}

		/// Queues an empty-body failure carrying `status`.
		pub fn fail(self, status: u16) -> Self {
			self.lock_replies().push_back(Err(status));

			self
		}

		/// Returns every request sent so far.
		pub fn posts(&self) -> Vec<RecordedPost> {
			self.posts.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
		}

		fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, u16>>> {
			self.replies.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
		}
	}
	impl SsoTransport for StubTransport {
		fn post<'a>(&'a self, url: &'a Url, body: String, _timeout: StdDuration) -> TransportFuture<'a> {
			Box::pin(async move {
				self.posts
					.lock()
					.unwrap_or_else(|poisoned| poisoned.into_inner())
					.push(RecordedPost { url: url.to_string(), body });

				match self.lock_replies().pop_front() {
					Some(Ok(body)) => Ok(body),
					Some(Err(status)) => Err(TransportError::EmptyBody { status: Some(status) }),
					None => Err(TransportError::EmptyBody { status: None }),
				}
			})
		}
	}

	/// Descriptor pointing at `base` with the usual VATSIM-style paths.
	pub fn test_descriptor(base: &str) -> SsoDescriptor {
		SsoDescriptor::builder()
			.base_url(Url::parse(base).expect("Test base URL should parse."))
			.api_path("api/")
			.login_token_path("login_token/")
			.user_data_path("login_return/")
			.redirect_path("auth/pre_login/?oauth_token=")
			.build()
			.expect("Test descriptor should build.")
	}

	/// Session with consumer `abc`/`shh`, HMAC-SHA1 signing, and the provided transport.
	pub fn build_test_session<T>(base: &str, transport: T) -> HandshakeSession<T>
	where
		T: SsoTransport,
	{
		let consumer = Consumer::new(TEST_CONSUMER_KEY).with_secret(TEST_CONSUMER_SECRET);

		HandshakeSession::with_transport(test_descriptor(base), consumer, transport)
			.with_signature("HMAC", None)
			.expect("HMAC signing should configure without a key.")
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};

/// Crate version, also sent in the default transport's `User-Agent`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
