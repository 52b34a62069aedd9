//! Transport primitives for provider round-trips.
//!
//! The session's only dependency on an HTTP stack is [`SsoTransport`]: POST a form body to a
//! URL within a timeout and hand back the response body. [`ReqwestHttpClient`] is the default
//! implementation; tests and hosts with their own stack implement the trait directly.

// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`SsoTransport::post`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<String, TransportError>> + 'a + Send>>;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(15);

/// Abstraction over HTTP transports able to POST signed handshake requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back many sessions,
/// and the returned future must be `Send` so callers can drive it from any executor.
/// Implementations report network failures, timeouts, and empty bodies as
/// [`TransportError`]; any non-empty body is returned as-is, whatever the HTTP status, because
/// the provider encodes its verdict inside the body.
pub trait SsoTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `body` as `application/x-www-form-urlencoded` to `url`.
	fn post<'a>(&'a self, url: &'a Url, body: String, timeout: StdDuration) -> TransportFuture<'a>;
}
impl<T> SsoTransport for Arc<T>
where
	T: ?Sized + SsoTransport,
{
	fn post<'a>(&'a self, url: &'a Url, body: String, timeout: StdDuration) -> TransportFuture<'a> {
		(**self).post(url, body, timeout)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Handshake endpoints answer directly; a redirect from them is never followed. Configure any
/// custom [`ReqwestClient`] passed to [`ReqwestHttpClient::with_client`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client with the crate's `User-Agent` and redirects disabled.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl SsoTransport for ReqwestHttpClient {
	fn post<'a>(&'a self, url: &'a Url, body: String, timeout: StdDuration) -> TransportFuture<'a> {
		Box::pin(async move {
			let response = self
				.0
				.post(url.clone())
				.header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
				.timeout(timeout)
				.body(body)
				.send()
				.await
				.map_err(|e| map_reqwest_error(e, timeout))?;
			let status = response.status().as_u16();
			let text = response.text().await.map_err(|e| map_reqwest_error(e, timeout))?;

			if text.trim().is_empty() {
				return Err(TransportError::EmptyBody { status: Some(status) });
			}

			Ok(text)
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(e: ReqwestError, timeout: StdDuration) -> TransportError {
	if e.is_timeout() { TransportError::Timeout { after: timeout } } else { e.into() }
}
