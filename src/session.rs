//! Handshake orchestration: request token, login redirect, verifier exchange.
//!
//! [`HandshakeSession`] owns the consumer credentials, the installed [`SignatureMethod`], the
//! response format, the pending request token, and the most recent [`ErrorRecord`]. Every
//! public operation takes `&mut self`, so one session drives one login attempt at a time, and
//! every fallible operation either clears the error record (success) or replaces it with
//! exactly one new record (failure). Network-bound steps build their outcome first and commit
//! the token change only once the whole step succeeded, so failures never leave partial state.

// self
use crate::{
	_prelude::*,
	auth::{Consumer, Token},
	decode::{self, HandshakeResult, ResponseFormat},
	error::{ConfigError, ErrorRecord},
	http::{DEFAULT_TIMEOUT, SsoTransport},
	obs::{self, HandshakeStep, StepOutcome, StepSpan},
	provider::SsoDescriptor,
	sign::{Parameters, RequestSigner, SignatureMethod, SignedRequest},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const HTTP_METHOD: &str = "POST";

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport.
pub type ReqwestSession = HandshakeSession<ReqwestHttpClient>;

/// Coarse handshake progress derived from the session's fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeState {
	/// No signature method is installed; no request can be signed.
	Unconfigured,
	/// Signing is possible and no request token is pending.
	Ready,
	/// A request token is pending and the user can be redirected.
	TokenObtained,
}

/// Stateful driver for one OAuth 1.0a login attempt.
pub struct HandshakeSession<T>
where
	T: SsoTransport,
{
	descriptor: SsoDescriptor,
	consumer: Consumer,
	transport: T,
	timeout: StdDuration,
	format: ResponseFormat,
	signature: Option<SignatureMethod>,
	token: Option<Token>,
	last_error: Option<ErrorRecord>,
}
impl<T> HandshakeSession<T>
where
	T: SsoTransport,
{
	/// Creates an unconfigured session on top of the caller-provided transport.
	pub fn with_transport(descriptor: SsoDescriptor, consumer: Consumer, transport: T) -> Self {
		Self {
			descriptor,
			consumer,
			transport,
			timeout: DEFAULT_TIMEOUT,
			format: ResponseFormat::default(),
			signature: None,
			token: None,
			last_error: None,
		}
	}

	/// Installs a signature method while building the session.
	pub fn with_signature(mut self, name: &str, private_key: Option<&str>) -> Result<Self> {
		self.configure_signature(name, private_key)?;

		Ok(self)
	}

	/// Overrides the per-call transport timeout (defaults to 15 seconds).
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the response format (defaults to JSON).
	pub fn with_format(mut self, format: ResponseFormat) -> Self {
		self.format = format;

		self
	}

	/// Installs the signature method named `name` (`HMAC`, `HMAC-SHA1`, `RSA`, `RSA-SHA1`).
	///
	/// The previous method is removed first, so a rejected name or missing RSA key leaves the
	/// session unable to sign rather than signing with a stale method.
	pub fn configure_signature(&mut self, name: &str, private_key: Option<&str>) -> Result<()> {
		self.signature = None;

		let result = SignatureMethod::from_name(name, private_key).map(|method| {
			self.signature = Some(method);
		});

		self.settle("configure_signature", result)
	}

	/// Current progress of the handshake.
	pub fn state(&self) -> HandshakeState {
		match (&self.signature, &self.token) {
			(None, _) => HandshakeState::Unconfigured,
			(Some(_), None) => HandshakeState::Ready,
			(Some(_), Some(_)) => HandshakeState::TokenObtained,
		}
	}

	/// Response format requested from the provider.
	pub fn format(&self) -> ResponseFormat {
		self.format
	}

	/// Switches the response format; `json` or `xml`, case-insensitive.
	///
	/// Any other value leaves the current format in place.
	pub fn set_format(&mut self, value: &str) -> Result<ResponseFormat> {
		let result = value.parse::<ResponseFormat>().map_err(Error::from).map(|format| {
			self.format = format;

			format
		});

		self.settle("set_format", result)
	}

	/// Installed signature method, if any.
	pub fn signature(&self) -> Option<&SignatureMethod> {
		self.signature.as_ref()
	}

	/// Pending request token, if any.
	pub fn token(&self) -> Option<&Token> {
		self.token.as_ref()
	}

	/// Consumer credentials.
	pub fn consumer(&self) -> &Consumer {
		&self.consumer
	}

	/// Provider descriptor.
	pub fn descriptor(&self) -> &SsoDescriptor {
		&self.descriptor
	}

	/// Most recent failure; `None` after a successful operation.
	pub fn last_error(&self) -> Option<&ErrorRecord> {
		self.last_error.as_ref()
	}

	/// Obtains a request token whose callback points at `callback_url`.
	///
	/// The suspended/inactive flags are forwarded to the provider untouched. The returned token
	/// is stored only when the provider reports success and confirms the callback.
	pub async fn request_token(
		&mut self,
		callback_url: &Url,
		allow_suspended: bool,
		allow_inactive: bool,
	) -> Result<HandshakeResult> {
		const STEP: HandshakeStep = HandshakeStep::RequestToken;

		let span = StepSpan::new(STEP, "request_token");

		obs::record_step_outcome(STEP, StepOutcome::Attempt);

		let outcome = span
			.instrument(self.fetch_request_token(callback_url, allow_suspended, allow_inactive))
			.await;
		let result = outcome.map(|(result, token)| {
			self.token = Some(token);

			result
		});

		record_outcome(STEP, &result);

		self.settle("request_token", result)
	}

	/// URL of the provider's login page for the pending token.
	///
	/// The caller delivers it to the user agent (typically as a `302 Location`) and ends its own
	/// handling of the current request.
	pub fn redirect_target(&mut self) -> Result<Url> {
		let result = match &self.token {
			Some(token) => self.descriptor.login_redirect(&token.key),
			None => Err(ConfigError::NoPendingToken.into()),
		};

		self.settle("redirect_target", result)
	}

	/// Exchanges the callback's token and verifier for the user's identity.
	///
	/// The credentials come from the provider's callback and are trusted as given, but a
	/// request token must still be pending in this session. Success consumes it; any failure
	/// leaves it in place.
	pub async fn check_login(
		&mut self,
		token_key: &str,
		token_secret: &str,
		verifier: &str,
	) -> Result<HandshakeResult> {
		const STEP: HandshakeStep = HandshakeStep::CheckLogin;

		let span = StepSpan::new(STEP, "check_login");

		obs::record_step_outcome(STEP, StepOutcome::Attempt);

		let result = if self.token.is_some() {
			span.instrument(self.exchange_verifier(token_key, token_secret, verifier)).await
		} else {
			Err(ConfigError::NoPendingToken.into())
		};

		if result.is_ok() {
			self.token = None;
		}

		record_outcome(STEP, &result);

		self.settle("check_login", result)
	}

	async fn fetch_request_token(
		&self,
		callback_url: &Url,
		allow_suspended: bool,
		allow_inactive: bool,
	) -> Result<(HandshakeResult, Token)> {
		let mut extra = Parameters::new();

		extra.insert("oauth_callback", callback_url.as_str());
		extra.insert("oauth_allow_suspended", flag(allow_suspended));
		extra.insert("oauth_allow_inactive", flag(allow_inactive));

		let url = self.descriptor.login_token_endpoint(self.format)?;
		let signed = self.signer()?.signed_request(None, HTTP_METHOD, &url, &extra)?;
		let result = self.send(&signed).await?;

		if !result.callback_confirmed() {
			return Err(Error::ProtocolMismatch {
				reason: "callback confirmation flag is missing or false".into(),
			});
		}

		let token = result.token_grant()?.into_token();

		Ok((result, token))
	}

	async fn exchange_verifier(
		&self,
		token_key: &str,
		token_secret: &str,
		verifier: &str,
	) -> Result<HandshakeResult> {
		let token = Token::new(token_key, token_secret);
		let extra = [("oauth_token", token_key), ("oauth_verifier", verifier)]
			.into_iter()
			.collect::<Parameters>();
		let url = self.descriptor.user_data_endpoint(self.format)?;
		let signed = self.signer()?.signed_request(Some(&token), HTTP_METHOD, &url, &extra)?;

		self.send(&signed).await
	}

	/// Posts `signed`, decodes the body, and turns a provider-reported failure into an error.
	async fn send(&self, signed: &SignedRequest) -> Result<HandshakeResult> {
		let body = self.transport.post(&signed.url, signed.body.clone(), self.timeout).await?;
		let result = decode::decode(self.format, &body)?;

		if result.success {
			Ok(result)
		} else {
			Err(Error::ProviderRejected { message: result.error_message.unwrap_or_default() })
		}
	}

	fn signer(&self) -> Result<RequestSigner<'_>> {
		let method = self.signature.as_ref().ok_or(ConfigError::SignatureNotConfigured)?;

		Ok(RequestSigner::new(method, &self.consumer))
	}

	fn settle<V>(&mut self, operation: &'static str, result: Result<V>) -> Result<V> {
		match &result {
			Ok(_) => self.last_error = None,
			Err(e) => {
				obs::trace_failure(operation, e);

				self.last_error = Some(ErrorRecord::from(e));
			},
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl HandshakeSession<ReqwestHttpClient> {
	/// Creates an unconfigured session backed by a fresh reqwest transport.
	pub fn new(descriptor: SsoDescriptor, consumer: Consumer) -> Result<Self> {
		Ok(Self::with_transport(descriptor, consumer, ReqwestHttpClient::new()?))
	}
}
impl<T> Debug for HandshakeSession<T>
where
	T: SsoTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HandshakeSession")
			.field("descriptor", &self.descriptor)
			.field("consumer_key", &self.consumer.key)
			.field("consumer_secret_set", &self.consumer.secret.is_some())
			.field("signature", &self.signature.as_ref().map(SignatureMethod::name))
			.field("format", &self.format)
			.field("state", &self.state())
			.field("last_error", &self.last_error)
			.finish()
	}
}

/// Boolean encoding the provider expects for its pass-through flags.
fn flag(value: bool) -> &'static str {
	if value { "1" } else { "" }
}

fn record_outcome<V>(step: HandshakeStep, result: &Result<V>) {
	match result {
		Ok(_) => obs::record_step_outcome(step, StepOutcome::Success),
		Err(_) => obs::record_step_outcome(step, StepOutcome::Failure),
	}
}
