//! Signature method families: HMAC-SHA1 over a shared secret and RSA-SHA1 over a private key.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rsa::{
	RsaPrivateKey,
	pkcs1::DecodeRsaPrivateKey,
	pkcs1v15::SigningKey,
	pkcs8::DecodePrivateKey,
	signature::{SignatureEncoding, Signer},
};
use sha1::Sha1;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError, sign::percent_encode};

type HmacSha1 = Hmac<Sha1>;

/// Wire name of the shared-secret family.
pub const HMAC_SHA1: &str = "HMAC-SHA1";
/// Wire name of the private-key family.
pub const RSA_SHA1: &str = "RSA-SHA1";

/// Installed signature algorithm.
///
/// Selection happens once at configuration time through [`SignatureMethod::from_name`]; signing
/// never re-inspects the name.
#[derive(Clone)]
pub enum SignatureMethod {
	/// HMAC-SHA1 keyed with `enc(consumer_secret)&enc(token_secret)`.
	SharedSecret,
	/// RSASSA-PKCS1-v1_5 over SHA-1 with the consumer's private key; secrets are ignored.
	PrivateKey(Box<SigningKey<Sha1>>),
}
impl SignatureMethod {
	/// Resolves a case-insensitive method name (`HMAC`, `HMAC-SHA1`, `RSA`, `RSA-SHA1`).
	///
	/// RSA names require PEM key material; a missing or blank key is rejected.
	pub fn from_name(name: &str, private_key: Option<&str>) -> Result<Self> {
		match name.trim().to_ascii_uppercase().as_str() {
			"HMAC" | HMAC_SHA1 => Ok(Self::SharedSecret),
			"RSA" | RSA_SHA1 => match private_key {
				Some(pem) if !pem.trim().is_empty() => Self::private_key_pem(pem),
				_ => Err(ConfigError::MissingPrivateKey.into()),
			},
			_ => Err(ConfigError::UnsupportedSignature { name: name.to_owned() }.into()),
		}
	}

	/// Builds the RSA-SHA1 method from a PKCS#8 or PKCS#1 PEM document.
	pub fn private_key_pem(pem: &str) -> Result<Self> {
		let key = RsaPrivateKey::from_pkcs8_pem(pem)
			.or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
			.map_err(|_| ConfigError::InvalidPrivateKey)?;

		Ok(Self::PrivateKey(Box::new(SigningKey::<Sha1>::new(key))))
	}

	/// Value sent as `oauth_signature_method`.
	pub fn name(&self) -> &'static str {
		match self {
			Self::SharedSecret => HMAC_SHA1,
			Self::PrivateKey(_) => RSA_SHA1,
		}
	}

	/// Signs `base_string` and returns the base64 signature value.
	pub fn sign(
		&self,
		base_string: &str,
		consumer_secret: Option<&Secret>,
		token_secret: Option<&Secret>,
	) -> Result<String> {
		let raw = match self {
			Self::SharedSecret => {
				let consumer_secret = consumer_secret.ok_or(ConfigError::MissingConsumerSecret)?;
				let key = format!(
					"{}&{}",
					percent_encode(consumer_secret.expose()),
					token_secret.map(|secret| percent_encode(secret.expose())).unwrap_or_default()
				);
				let mut mac = HmacSha1::new_from_slice(key.as_bytes())
					.map_err(|e| ConfigError::Signing { message: e.to_string() })?;

				mac.update(base_string.as_bytes());

				mac.finalize().into_bytes().to_vec()
			},
			Self::PrivateKey(key) => key
				.try_sign(base_string.as_bytes())
				.map_err(|e| ConfigError::Signing { message: e.to_string() })?
				.to_vec(),
		};

		Ok(STANDARD.encode(raw))
	}
}
impl Debug for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SignatureMethod").field(&self.name()).finish()
	}
}
