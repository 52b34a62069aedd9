//! Builder that assembles and validates [`SsoDescriptor`] values.

// self
use crate::{
	_prelude::*,
	provider::{SsoDescriptor, SsoPaths},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum SsoDescriptorError {
	/// The base URL is mandatory.
	#[error("Missing base URL.")]
	MissingBaseUrl,
	/// Only HTTP(S) providers are supported.
	#[error("The base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Fragments are appended to the base URL, so it cannot carry a query or fragment.
	#[error("The base URL must not carry a query or fragment: {url}.")]
	BaseUrlHasSuffix {
		/// Base URL that failed validation.
		url: String,
	},
	/// Path fragments must not contain whitespace or control characters.
	#[error("The {path} path contains whitespace or control characters.")]
	InvalidPath {
		/// Which fragment failed validation.
		path: &'static str,
	},
}

/// Builder for [`SsoDescriptor`] values.
#[derive(Debug, Default)]
pub struct SsoDescriptorBuilder {
	/// Provider base URL.
	pub base_url: Option<Url>,
	/// Path fragments collected so far.
	pub paths: SsoPaths,
}
impl SsoDescriptorBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the provider base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the API directory.
	pub fn api_path(mut self, path: impl Into<String>) -> Self {
		self.paths.api = path.into();

		self
	}

	/// Sets the request-token path.
	pub fn login_token_path(mut self, path: impl Into<String>) -> Self {
		self.paths.login_token = path.into();

		self
	}

	/// Sets the user-data path.
	pub fn user_data_path(mut self, path: impl Into<String>) -> Self {
		self.paths.user_data = path.into();

		self
	}

	/// Sets the login redirect path.
	pub fn redirect_path(mut self, path: impl Into<String>) -> Self {
		self.paths.redirect = path.into();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<SsoDescriptor, SsoDescriptorError> {
		let base_url = self.base_url.ok_or(SsoDescriptorError::MissingBaseUrl)?;
		let descriptor = SsoDescriptor { base_url, paths: self.paths };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl SsoDescriptor {
	/// Validates invariants for the descriptor.
	pub fn validate(&self) -> Result<(), SsoDescriptorError> {
		let url = &self.base_url;

		if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
			return Err(SsoDescriptorError::UnsupportedScheme { url: url.to_string() });
		}
		if url.query().is_some() || url.fragment().is_some() {
			return Err(SsoDescriptorError::BaseUrlHasSuffix { url: url.to_string() });
		}

		validate_path("api", &self.paths.api)?;
		validate_path("login_token", &self.paths.login_token)?;
		validate_path("user_data", &self.paths.user_data)?;
		validate_path("redirect", &self.paths.redirect)?;

		Ok(())
	}
}

fn validate_path(path: &'static str, value: &str) -> Result<(), SsoDescriptorError> {
	if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
		Err(SsoDescriptorError::InvalidPath { path })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn base_url_is_required() {
		assert_eq!(SsoDescriptor::builder().build(), Err(SsoDescriptorError::MissingBaseUrl));
	}

	#[test]
	fn base_url_must_be_plain_http() {
		let err = SsoDescriptor::builder()
			.base_url(url("ftp://sso.example.com/"))
			.build()
			.expect_err("Non-HTTP schemes should be rejected.");

		assert!(matches!(err, SsoDescriptorError::UnsupportedScheme { .. }));

		let err = SsoDescriptor::builder()
			.base_url(url("https://sso.example.com/?x=1"))
			.build()
			.expect_err("Query strings should be rejected.");

		assert!(matches!(err, SsoDescriptorError::BaseUrlHasSuffix { .. }));
	}

	#[test]
	fn paths_reject_whitespace() {
		let err = SsoDescriptor::builder()
			.base_url(url("https://sso.example.com/"))
			.login_token_path("login token/")
			.build()
			.expect_err("Whitespace should be rejected.");

		assert_eq!(err, SsoDescriptorError::InvalidPath { path: "login_token" });
	}

	#[test]
	fn descriptor_round_trips_through_serde() {
		let descriptor = SsoDescriptor::builder()
			.base_url(url("https://sso.example.com/"))
			.api_path("api/")
			.build()
			.expect("Descriptor should build.");
		let json = serde_json::to_string(&descriptor).expect("Descriptor should serialize.");
		let back: SsoDescriptor =
			serde_json::from_str(&json).expect("Descriptor should deserialize.");

		assert_eq!(back, descriptor);
		assert!(back.validate().is_ok());
	}
}
