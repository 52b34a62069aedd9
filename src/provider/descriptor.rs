//! Provider descriptor and endpoint composition.

// self
use crate::{
	_prelude::*,
	decode::ResponseFormat,
	error::ConfigError,
	provider::SsoDescriptorBuilder,
	sign::percent_encode,
};

/// Path fragments appended to the base URL.
///
/// Fragments are concatenated verbatim, so each one carries its own separators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsoPaths {
	/// API directory, shared by the token and user-data endpoints.
	pub api: String,
	/// Request-token endpoint below [`SsoPaths::api`].
	pub login_token: String,
	/// Verifier-exchange endpoint below [`SsoPaths::api`].
	pub user_data: String,
	/// Login page below the base URL; the token key is appended to it.
	pub redirect: String,
}

/// Immutable provider descriptor consumed by [`HandshakeSession`](crate::session::HandshakeSession).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoDescriptor {
	/// Provider base URL.
	pub base_url: Url,
	/// Endpoint path fragments.
	pub paths: SsoPaths,
}
impl SsoDescriptor {
	/// Creates an empty builder.
	pub fn builder() -> SsoDescriptorBuilder {
		SsoDescriptorBuilder::new()
	}

	/// `base + api + login_token + format + "/"`.
	pub fn login_token_endpoint(&self, format: ResponseFormat) -> Result<Url> {
		self.compose(&[&self.paths.api, &self.paths.login_token, format.as_str(), "/"])
	}

	/// `base + api + user_data + format + "/"`.
	pub fn user_data_endpoint(&self, format: ResponseFormat) -> Result<Url> {
		self.compose(&[&self.paths.api, &self.paths.user_data, format.as_str(), "/"])
	}

	/// `base + redirect + token_key`, the page the user signs in on.
	pub fn login_redirect(&self, token_key: &str) -> Result<Url> {
		self.compose(&[&self.paths.redirect, &percent_encode(token_key)])
	}

	fn compose(&self, parts: &[&str]) -> Result<Url> {
		let mut raw = self.base_url.as_str().to_owned();

		parts.iter().for_each(|part| raw.push_str(part));

		Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { url: raw, source }.into())
	}
}
