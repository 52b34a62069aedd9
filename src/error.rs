//! Handshake-level error types shared across signing, decoding, transport, and the session.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical handshake error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem or violated precondition.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The provider could not be reached (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The provider answered with a body that does not match the configured format.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The provider returned a structured failure.
	#[error("Provider rejected the request: {message}.")]
	ProviderRejected {
		/// Message supplied in `request.message`.
		message: String,
	},
	/// The provider reported success but the response breaks the protocol contract.
	#[error("Provider response violates the handshake protocol: {reason}.")]
	ProtocolMismatch {
		/// Human-readable description of the mismatch.
		reason: String,
	},
}
impl Error {
	/// Classifies the error into the stable [`ErrorKind`] taxonomy.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Configuration,
			Self::Transport(_) => ErrorKind::Transport,
			Self::Decode(_) => ErrorKind::Decode,
			Self::ProviderRejected { .. } => ErrorKind::ProviderRejected,
			Self::ProtocolMismatch { .. } => ErrorKind::ProtocolMismatch,
		}
	}

	/// Numeric code attached to the failure, when the transport produced one.
	pub fn code(&self) -> Option<i64> {
		match self {
			Self::Transport(e) => e.code(),
			_ => None,
		}
	}
}

/// Configuration and precondition failures raised before or instead of a network call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint composed from the descriptor is not a valid URL.
	#[error("Endpoint `{url}` is not a valid URL.")]
	InvalidEndpoint {
		/// Composed endpoint string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Signing URL cannot be normalized into a base-string URL.
	#[error("URL `{url}` cannot be used as a signature base URL.")]
	InvalidBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// HTTP method is empty or contains characters outside the token set.
	#[error("HTTP method `{method}` is invalid.")]
	InvalidMethod {
		/// Offending method string.
		method: String,
	},

	/// No signature method has been installed on the session.
	#[error("No signature method is configured.")]
	SignatureNotConfigured,
	/// Signature method name is not one of the supported families.
	#[error("Signature method `{name}` is not supported; expected HMAC-SHA1 or RSA-SHA1.")]
	UnsupportedSignature {
		/// Name supplied by the caller.
		name: String,
	},
	/// RSA signing was requested without key material.
	#[error("RSA-SHA1 signing requires a private key.")]
	MissingPrivateKey,
	/// RSA key material could not be parsed.
	#[error("Private key is not a valid PKCS#8 or PKCS#1 PEM document.")]
	InvalidPrivateKey,
	/// The signature primitive rejected its inputs.
	#[error("Signature computation failed: {message}.")]
	Signing {
		/// Primitive-specific failure description.
		message: String,
	},
	/// HMAC-SHA1 signing was requested but the consumer has no secret.
	#[error("HMAC-SHA1 signing requires a consumer secret.")]
	MissingConsumerSecret,
	/// Response format value is neither `json` nor `xml`.
	#[error("Response format `{value}` is not supported; expected json or xml.")]
	UnsupportedFormat {
		/// Value supplied by the caller.
		value: String,
	},
	/// No request token is pending in the session.
	#[error("No request token is pending; call request_token first.")]
	NoPendingToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// HTTP status code, when the failure happened after a response started.
		status: Option<u16>,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Provider did not respond within {after:?}.")]
	Timeout {
		/// Timeout that elapsed.
		after: StdDuration,
	},
	/// The provider answered with an empty body.
	#[error("Provider returned an empty response body.")]
	EmptyBody {
		/// HTTP status code of the empty response, when available.
		status: Option<u16>,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { status: None, source: Box::new(src) }
	}

	/// Numeric code describing the failure (HTTP status or OS error code).
	pub fn code(&self) -> Option<i64> {
		match self {
			Self::Network { status, .. } | Self::EmptyBody { status } => status.map(i64::from),
			Self::Io(e) => e.raw_os_error().map(i64::from),
			Self::Timeout { .. } => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		let status = e.status().map(|status| status.as_u16());

		Self::Network { status, source: Box::new(e) }
	}
}

/// Failures while parsing a provider response body.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON.
	#[error("Provider response is not valid JSON.")]
	Json(#[from] serde_json::Error),
	/// Body is not well-formed XML.
	#[error("Provider response is not well-formed XML: {message}.")]
	Xml {
		/// Parser message.
		message: String,
	},
	/// Body parsed but lacks a field the handshake needs.
	#[error("Provider response does not match the expected shape.")]
	Shape(#[from] serde_path_to_error::Error<serde_json::Error>),
}
impl DecodeError {
	/// Wraps an XML parser failure.
	pub fn xml(message: impl Display) -> Self {
		Self::Xml { message: message.to_string() }
	}
}

/// Stable classification of handshake failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// Network or timeout failure reaching the provider.
	Transport,
	/// Response body could not be parsed as the configured format.
	Decode,
	/// Provider returned a structured failure.
	ProviderRejected,
	/// Provider claimed success without the required confirmation.
	ProtocolMismatch,
	/// Local configuration problem or violated precondition.
	Configuration,
}
impl ErrorKind {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::Transport => "transport",
			ErrorKind::Decode => "decode",
			ErrorKind::ProviderRejected => "provider_rejected",
			ErrorKind::ProtocolMismatch => "protocol_mismatch",
			ErrorKind::Configuration => "configuration",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Snapshot of the most recent failure, kept by the session for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
	/// Failure classification.
	pub kind: ErrorKind,
	/// Transport or HTTP code, when one exists.
	pub code: Option<i64>,
	/// Human-readable message.
	pub message: String,
}
impl From<&Error> for ErrorRecord {
	fn from(e: &Error) -> Self {
		let message = match e {
			Error::ProviderRejected { message } => message.clone(),
			other => other.to_string(),
		};

		Self { kind: e.kind(), code: e.code(), message }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_keeps_provider_message_verbatim() {
		let err = Error::ProviderRejected { message: "Token expired".into() };
		let record = ErrorRecord::from(&err);

		assert_eq!(record.kind, ErrorKind::ProviderRejected);
		assert_eq!(record.code, None);
		assert_eq!(record.message, "Token expired");
	}

	#[test]
	fn transport_codes_surface_in_records() {
		let err: Error = TransportError::EmptyBody { status: Some(502) }.into();
		let record = ErrorRecord::from(&err);

		assert_eq!(record.kind, ErrorKind::Transport);
		assert_eq!(record.code, Some(502));
	}

	#[test]
	fn kinds_serialize_as_snake_case() {
		let json = serde_json::to_string(&ErrorKind::ProtocolMismatch)
			.expect("Error kind should serialize.");

		assert_eq!(json, "\"protocol_mismatch\"");
		assert_eq!(ErrorKind::Configuration.to_string(), "configuration");
	}
}
