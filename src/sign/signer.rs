//! Protocol-parameter assembly and request signing.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{Consumer, Token},
	sign::{CanonicalRequest, Parameters, SignatureMethod},
};

/// Value sent as `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

const NONCE_LEN: usize = 32;

/// Nonce and timestamp bound into one signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningContext {
	/// Single-use random value sent as `oauth_nonce`.
	pub nonce: String,
	/// Unix seconds sent as `oauth_timestamp`.
	pub timestamp: i64,
}
impl SigningContext {
	/// Draws a fresh nonce from the thread-local CSPRNG and stamps the current time.
	pub fn fresh() -> Self {
		Self {
			nonce: rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect(),
			timestamp: OffsetDateTime::now_utc().unix_timestamp(),
		}
	}

	/// Pins both values; useful for reproducing a signature.
	pub fn fixed(nonce: impl Into<String>, timestamp: i64) -> Self {
		Self { nonce: nonce.into(), timestamp }
	}
}

/// Fully signed request ready for the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// Target URL.
	pub url: Url,
	/// Base string that was signed.
	pub base_string: String,
	/// Every sent parameter, `oauth_signature` included.
	pub params: Parameters,
	/// Sorted, percent-encoded POST body.
	pub body: String,
}

/// Signs requests for one consumer with one signature method.
///
/// Borrowing both keeps the signer from ever mutating credentials.
#[derive(Clone, Copy, Debug)]
pub struct RequestSigner<'a> {
	method: &'a SignatureMethod,
	consumer: &'a Consumer,
}
impl<'a> RequestSigner<'a> {
	/// Creates a signer bound to `method` and `consumer`.
	pub fn new(method: &'a SignatureMethod, consumer: &'a Consumer) -> Self {
		Self { method, consumer }
	}

	/// Signs a request with a fresh [`SigningContext`].
	pub fn signed_request(
		&self,
		token: Option<&Token>,
		http_method: &str,
		url: &Url,
		extra: &Parameters,
	) -> Result<SignedRequest> {
		self.signed_request_with(SigningContext::fresh(), token, http_method, url, extra)
	}

	/// Signs a request with the supplied nonce and timestamp.
	///
	/// `extra` entries win over protocol fields that share a key.
	pub fn signed_request_with(
		&self,
		context: SigningContext,
		token: Option<&Token>,
		http_method: &str,
		url: &Url,
		extra: &Parameters,
	) -> Result<SignedRequest> {
		let mut params = Parameters::new();

		params.insert("oauth_consumer_key", self.consumer.key.as_str());
		params.insert("oauth_nonce", context.nonce);
		params.insert("oauth_signature_method", self.method.name());
		params.insert("oauth_timestamp", context.timestamp.to_string());
		params.insert("oauth_version", OAUTH_VERSION);

		if let Some(token) = token {
			params.insert("oauth_token", token.key.as_str());
		}

		params.extend(extra.iter());

		let canonical = CanonicalRequest::build(http_method, url, &params)?;
		let signature = self.method.sign(
			&canonical.base_string,
			self.consumer.secret.as_ref(),
			token.map(|token| &token.secret),
		)?;

		params.insert("oauth_signature", signature);

		let body = params.normalized();

		Ok(SignedRequest { url: url.clone(), base_string: canonical.base_string, params, body })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn consumer() -> Consumer {
		Consumer::new("abc").with_secret("shh")
	}

	fn token_url() -> Url {
		Url::parse("https://sso.example.com/api/login_token/json/").expect("Test URL should parse.")
	}

	#[test]
	fn protocol_parameters_are_merged_and_signed() {
		let consumer = consumer();
		let method = SignatureMethod::SharedSecret;
		let extra = [("oauth_callback", "https://app.example/cb")].into_iter().collect();
		let request = RequestSigner::new(&method, &consumer)
			.signed_request_with(
				SigningContext::fixed("n0nce", 1_700_000_000),
				None,
				"POST",
				&token_url(),
				&extra,
			)
			.expect("Signing should succeed.");

		assert_eq!(request.params.get("oauth_consumer_key"), Some("abc"));
		assert_eq!(request.params.get("oauth_nonce"), Some("n0nce"));
		assert_eq!(request.params.get("oauth_timestamp"), Some("1700000000"));
		assert_eq!(request.params.get("oauth_signature_method"), Some("HMAC-SHA1"));
		assert_eq!(request.params.get("oauth_version"), Some("1.0"));
		assert_eq!(request.params.get("oauth_callback"), Some("https://app.example/cb"));
		assert_eq!(request.params.get("oauth_token"), None);
		assert!(request.body.contains("oauth_callback=https%3A%2F%2Fapp.example%2Fcb"));

		let unsigned = request
			.params
			.iter()
			.filter(|(key, _)| *key != "oauth_signature")
			.collect::<Parameters>();
		let canonical = CanonicalRequest::build("POST", &token_url(), &unsigned)
			.expect("Canonicalization should succeed.");
		let expected = method
			.sign(&canonical.base_string, consumer.secret.as_ref(), None)
			.expect("Re-signing should succeed.");

		assert_eq!(canonical.base_string, request.base_string);
		assert_eq!(request.params.get("oauth_signature"), Some(expected.as_str()));
	}

	#[test]
	fn same_context_yields_same_signature() {
		let consumer = consumer();
		let method = SignatureMethod::SharedSecret;
		let token = Token::new("T1", "S1");
		let signer = RequestSigner::new(&method, &consumer);
		let sign = |nonce: &str| {
			signer
				.signed_request_with(
					SigningContext::fixed(nonce, 42),
					Some(&token),
					"POST",
					&token_url(),
					&Parameters::new(),
				)
				.expect("Signing should succeed.")
		};

		assert_eq!(sign("a"), sign("a"));
		assert_ne!(
			sign("a").params.get("oauth_signature"),
			sign("b").params.get("oauth_signature")
		);
		assert_eq!(sign("a").params.get("oauth_token"), Some("T1"));
	}

	#[test]
	fn fresh_contexts_use_unique_alphanumeric_nonces() {
		let a = SigningContext::fresh();
		let b = SigningContext::fresh();

		assert_eq!(a.nonce.len(), NONCE_LEN);
		assert!(a.nonce.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(a.nonce, b.nonce);
		assert!(a.timestamp > 0);
	}
}
