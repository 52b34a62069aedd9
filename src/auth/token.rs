//! Provider-issued token credentials.

// self
use crate::{_prelude::*, auth::Secret};

/// Token key/secret pair issued by the provider.
///
/// During the handshake this is the request token: minted by `request_token`, echoed back on
/// the callback, and consumed by `check_login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Public token value sent as `oauth_token`.
	pub key: String,
	/// Token secret mixed into HMAC-SHA1 keys.
	pub secret: Secret,
}
impl Token {
	/// Creates a token from its key and secret.
	pub fn new(key: impl Into<String>, secret: impl Into<Secret>) -> Self {
		Self { key: key.into(), secret: secret.into() }
	}
}
