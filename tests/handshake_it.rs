#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth1_sso::{
	_preludet::*,
	auth::{Consumer, Token},
	decode::ResponseFormat,
	error::{ErrorKind, TransportError},
	http::ReqwestHttpClient,
	session::{HandshakeSession, HandshakeState, ReqwestSession},
};

const TOKEN_JSON: &str = r#"{"request":{"result":"success","message":""},"token":{"oauth_token":"T1","oauth_token_secret":"S1","oauth_callback_confirmed":"true"}}"#;
const USER_JSON: &str = r#"{"request":{"result":"success","message":""},"token":{"oauth_token":"T1"},"user":{"id":"1300001","name_first":"Ada","name_last":"Lovelace","rating":{"id":"5","short":"C1"}}}"#;

fn build_session(server: &MockServer) -> ReqwestSession {
	let transport = ReqwestHttpClient::new().expect("Reqwest transport should build.");

	build_test_session(&server.base_url(), transport)
}

fn callback() -> Url {
	Url::parse("https://app.example.com/sso/callback").expect("Callback URL should parse.")
}

#[tokio::test]
async fn json_handshake_round_trips_through_http() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/login_token/json/")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("oauth_consumer_key", TEST_CONSUMER_KEY)
				.form_urlencoded_tuple("oauth_signature_method", "HMAC-SHA1")
				.form_urlencoded_tuple("oauth_version", "1.0")
				.form_urlencoded_tuple("oauth_callback", "https://app.example.com/sso/callback")
				.form_urlencoded_tuple_exists("oauth_signature")
				.form_urlencoded_tuple_exists("oauth_nonce")
				.form_urlencoded_tuple_exists("oauth_timestamp");
			then.status(200).header("content-type", "application/json").body(TOKEN_JSON);
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/login_return/json/")
				.form_urlencoded_tuple("oauth_token", "T1")
				.form_urlencoded_tuple("oauth_verifier", "V1");
			then.status(200).header("content-type", "application/json").body(USER_JSON);
		})
		.await;
	let mut session = build_session(&server);

	session
		.request_token(&callback(), false, false)
		.await
		.expect("Request token step should succeed against the mock provider.");

	assert_eq!(session.state(), HandshakeState::TokenObtained);

	let redirect = session.redirect_target().expect("Redirect should compose.");

	assert_eq!(redirect.path(), "/auth/pre_login/");
	assert_eq!(redirect.query(), Some("oauth_token=T1"));

	let identity = session
		.check_login("T1", "S1", "V1")
		.await
		.expect("Verifier exchange should succeed against the mock provider.");
	let user = identity.user().expect("Identity payload should carry a user section.");

	assert_eq!(user["id"], "1300001");
	assert_eq!(user["rating"]["short"], "C1");
	assert_eq!(session.token(), None);
	assert!(session.last_error().is_none());

	token_mock.assert_async().await;
	user_mock.assert_async().await;
}

#[tokio::test]
async fn xml_handshake_uses_xml_endpoints() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/login_token/xml/");
			then.status(200).header("content-type", "text/xml").body(
				"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sso>\n  <request>\n    <result>success</result>\n    <message></message>\n  </request>\n  <token>\n    <oauth_token>TX</oauth_token>\n    <oauth_token_secret>SX</oauth_token_secret>\n    <oauth_callback_confirmed>true</oauth_callback_confirmed>\n  </token>\n</sso>",
			);
		})
		.await;
	let mut session = build_session(&server);

	session.set_format("XML").expect("XML should be accepted.");

	assert_eq!(session.format(), ResponseFormat::Xml);

	session
		.request_token(&callback(), true, false)
		.await
		.expect("XML request token step should succeed.");

	assert_eq!(session.token(), Some(&Token::new("TX", "SX")));

	token_mock.assert_async().await;
}

#[tokio::test]
async fn provider_failure_is_reported_verbatim() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/login_token/json/");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"request":{"result":"fail","message":"Invalid consumer key"}}"#);
		})
		.await;
	let mut session = build_session(&server);
	let err = session
		.request_token(&callback(), false, false)
		.await
		.expect_err("Provider failure should surface as an error.");

	assert_eq!(err.kind(), ErrorKind::ProviderRejected);

	let record = session.last_error().expect("Failure should be recorded.");

	assert_eq!(record.message, "Invalid consumer key");
	assert_eq!(session.state(), HandshakeState::Ready);

	mock.assert_async().await;
}

#[tokio::test]
async fn empty_body_is_a_transport_failure() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/login_token/json/");
			then.status(500);
		})
		.await;
	let mut session = build_session(&server);
	let err = session
		.request_token(&callback(), false, false)
		.await
		.expect_err("Empty body should fail.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::EmptyBody { status: Some(500) })
	));
	assert_eq!(session.last_error().and_then(|record| record.code), Some(500));

	mock.assert_async().await;
}

#[tokio::test]
async fn slow_provider_times_out() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/login_token/json/");
			then.status(200).delay(StdDuration::from_millis(500)).body(TOKEN_JSON);
		})
		.await;
	let mut session = build_session(&server).with_timeout(StdDuration::from_millis(50));
	let err = session
		.request_token(&callback(), false, false)
		.await
		.expect_err("Slow provider should time out.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
	assert_eq!(session.token(), None);
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_failure() {
	let transport = ReqwestHttpClient::new().expect("Reqwest transport should build.");
	let consumer = Consumer::new(TEST_CONSUMER_KEY).with_secret(TEST_CONSUMER_SECRET);
	let mut session =
		HandshakeSession::with_transport(test_descriptor("http://127.0.0.1:9"), consumer, transport)
			.with_signature("HMAC-SHA1", None)
			.expect("HMAC signing should configure.");
	let err = session
		.request_token(&callback(), false, false)
		.await
		.expect_err("Connection refusal should fail.");

	assert_eq!(err.kind(), ErrorKind::Transport);
	assert_eq!(session.last_error().map(|record| record.kind), Some(ErrorKind::Transport));
}
