//! Relying-application credentials registered with the provider.

// self
use crate::{_prelude::*, auth::Secret};

/// Consumer key plus the optional shared secret used by HMAC-SHA1 signing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
	/// Consumer key sent as `oauth_consumer_key`.
	pub key: String,
	/// Shared secret; only HMAC-SHA1 reads it.
	pub secret: Option<Secret>,
}
impl Consumer {
	/// Creates a consumer without a shared secret.
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: key.into(), secret: None }
	}

	/// Attaches the shared secret.
	pub fn with_secret(mut self, secret: impl Into<Secret>) -> Self {
		self.secret = Some(secret.into());

		self
	}
}
