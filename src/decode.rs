//! Provider response decoding for the two supported wire formats.
//!
//! Both formats normalize into a [`serde_json::Value`] tree so the session never branches on
//! the format after parsing. A body that cannot be parsed, or that lacks the `request` section,
//! is a [`DecodeError`]; a well-formed body whose `request.result` is anything but `success` is
//! a provider-reported failure carried in [`HandshakeResult`].

pub mod xml;

// self
use crate::{
	_prelude::*,
	auth::{Secret, Token},
	error::{ConfigError, DecodeError},
};

const SUCCESS: &str = "success";

/// Wire format requested from the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
	/// `application/json` bodies.
	#[default]
	Json,
	/// XML bodies.
	Xml,
}
impl ResponseFormat {
	/// Lowercase label used in endpoint paths.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResponseFormat::Json => "json",
			ResponseFormat::Xml => "xml",
		}
	}
}
impl Display for ResponseFormat {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ResponseFormat {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"json" => Ok(Self::Json),
			"xml" => Ok(Self::Xml),
			_ => Err(ConfigError::UnsupportedFormat { value: s.to_owned() }),
		}
	}
}

/// Format-independent outcome of one provider call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandshakeResult {
	/// `true` when `request.result` was `success`.
	pub success: bool,
	/// Whole decoded tree on success.
	pub payload: Option<Value>,
	/// `request.message` on failure.
	pub error_message: Option<String>,
}
impl HandshakeResult {
	/// Whether the provider echoed `token.oauth_callback_confirmed = true`.
	///
	/// Accepts the string `"true"` (both formats) and the JSON boolean `true`.
	pub fn callback_confirmed(&self) -> bool {
		self.payload
			.as_ref()
			.and_then(|payload| payload.pointer("/token/oauth_callback_confirmed"))
			.is_some_and(is_truthy)
	}

	/// Extracts the `token` section issued by the request-token step.
	pub fn token_grant(&self) -> Result<TokenGrant> {
		#[derive(Deserialize)]
		struct Envelope {
			token: TokenGrant,
		}

		let payload = self.payload.as_ref().unwrap_or(&Value::Null);
		let envelope: Envelope =
			serde_path_to_error::deserialize(payload).map_err(DecodeError::from)?;

		Ok(envelope.token)
	}

	/// Identity section returned by the verification step, when present.
	pub fn user(&self) -> Option<&Value> {
		self.payload.as_ref().and_then(|payload| payload.get("user"))
	}
}

/// `token` section of a request-token response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
	/// Request token key.
	pub oauth_token: String,
	/// Request token secret.
	pub oauth_token_secret: Secret,
}
impl TokenGrant {
	/// Converts the grant into the session's [`Token`].
	pub fn into_token(self) -> Token {
		Token::new(self.oauth_token, self.oauth_token_secret)
	}
}

#[derive(Deserialize)]
struct RequestStatus {
	result: String,
	#[serde(default)]
	message: Option<String>,
}

#[derive(Deserialize)]
struct StatusEnvelope {
	request: RequestStatus,
}

/// Parses `raw` in `format` and classifies the provider's verdict.
pub fn decode(format: ResponseFormat, raw: &str) -> Result<HandshakeResult> {
	let tree = match format {
		ResponseFormat::Json => serde_json::from_str::<Value>(raw).map_err(DecodeError::from)?,
		ResponseFormat::Xml => xml::parse(raw)?,
	};
	let status: StatusEnvelope =
		serde_path_to_error::deserialize(&tree).map_err(DecodeError::from)?;

	if status.request.result == SUCCESS {
		Ok(HandshakeResult { success: true, payload: Some(tree), error_message: None })
	} else {
		Ok(HandshakeResult {
			success: false,
			payload: None,
			error_message: Some(status.request.message.unwrap_or_default()),
		})
	}
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Bool(flag) => *flag,
		Value::String(text) => text == "true",
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const TOKEN_JSON: &str = r#"{"request":{"result":"success","message":""},"token":{"oauth_token":"T1","oauth_token_secret":"S1","oauth_callback_confirmed":"true"}}"#;
	const TOKEN_XML: &str = "<?xml version=\"1.0\"?><sso><request><result>success</result><message></message></request><token><oauth_token>T1</oauth_token><oauth_token_secret>S1</oauth_token_secret><oauth_callback_confirmed>true</oauth_callback_confirmed></token></sso>";

	#[test]
	fn formats_parse_case_insensitively() {
		assert_eq!("XML".parse::<ResponseFormat>().expect("XML should parse."), ResponseFormat::Xml);
		assert_eq!("xml".parse::<ResponseFormat>().expect("xml should parse."), ResponseFormat::Xml);
		assert_eq!(
			"Json".parse::<ResponseFormat>().expect("Json should parse."),
			ResponseFormat::Json
		);
		assert!(matches!(
			"yaml".parse::<ResponseFormat>(),
			Err(ConfigError::UnsupportedFormat { .. })
		));
		assert!("".parse::<ResponseFormat>().is_err());
	}

	#[test]
	fn json_and_xml_decode_to_the_same_tree() {
		let json = decode(ResponseFormat::Json, TOKEN_JSON).expect("JSON should decode.");
		let xml = decode(ResponseFormat::Xml, TOKEN_XML).expect("XML should decode.");

		assert!(json.success);
		assert_eq!(json, xml);
		assert!(json.callback_confirmed());

		let token = json.token_grant().expect("Token section should deserialize.").into_token();

		assert_eq!(token, Token::new("T1", "S1"));
	}

	#[test]
	fn provider_failure_carries_message() {
		let body = r#"{"request":{"result":"fail","message":"Consumer key invalid"}}"#;
		let result = decode(ResponseFormat::Json, body).expect("Failure body should decode.");

		assert!(!result.success);
		assert_eq!(result.payload, None);
		assert_eq!(result.error_message.as_deref(), Some("Consumer key invalid"));
	}

	#[test]
	fn unparsable_bodies_are_decode_errors() {
		assert!(matches!(
			decode(ResponseFormat::Json, "<sso></sso>"),
			Err(Error::Decode(DecodeError::Json(_)))
		));
		assert!(matches!(
			decode(ResponseFormat::Xml, TOKEN_JSON),
			Err(Error::Decode(DecodeError::Xml { .. }))
		));
	}

	#[test]
	fn missing_request_section_reports_its_path() {
		let err = decode(ResponseFormat::Json, r#"{"request":{"message":"x"}}"#)
			.expect_err("Missing result should fail.");

		match err {
			Error::Decode(DecodeError::Shape(inner)) =>
				assert_eq!(inner.path().to_string(), "request"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn callback_flag_accepts_only_true() {
		let confirmed = |flag: &str| {
			let body = format!(
				r#"{{"request":{{"result":"success"}},"token":{{"oauth_token":"T","oauth_token_secret":"S","oauth_callback_confirmed":{flag}}}}}"#
			);

			decode(ResponseFormat::Json, &body).expect("Body should decode.").callback_confirmed()
		};

		assert!(confirmed("\"true\""));
		assert!(confirmed("true"));
		assert!(!confirmed("\"false\""));
		assert!(!confirmed("\"1\""));
		assert!(!confirmed("null"));
	}

	#[test]
	fn user_section_is_exposed() {
		let body = r#"{"request":{"result":"success"},"user":{"id":"1300001","name_first":"Ada"}}"#;
		let result = decode(ResponseFormat::Json, body).expect("Identity body should decode.");
		let user = result.user().expect("User section should be present.");

		assert_eq!(user["id"], "1300001");
		assert!(result.token_grant().is_err());
	}
}
