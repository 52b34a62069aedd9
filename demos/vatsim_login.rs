//! Walks one interactive login against a VATSIM-style SSO provider.
//!
//! 1. Describe the provider with [`SsoDescriptor::builder`] and create a [`ReqwestSession`].
//! 2. Install HMAC-SHA1 (or RSA-SHA1 when `SSO_PRIVATE_KEY_PATH` is set).
//! 3. Obtain a request token and print the login URL for the user.
//! 4. Paste the `oauth_token` and `oauth_verifier` from the callback to fetch the identity.
//!
//! Required environment: `SSO_BASE_URL`, `SSO_CONSUMER_KEY`, `SSO_CALLBACK_URL`, plus
//! `SSO_CONSUMER_SECRET` for HMAC-SHA1.

// std
use std::{env, fs, io};
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth1_sso::{
	auth::Consumer,
	provider::SsoDescriptor,
	session::{HandshakeSession, ReqwestSession},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let descriptor = SsoDescriptor::builder()
		.base_url(Url::parse(&env::var("SSO_BASE_URL")?)?)
		.api_path("api/")
		.login_token_path("login_token/")
		.user_data_path("login_return/")
		.redirect_path("auth/pre_login/?oauth_token=")
		.build()?;
	let mut consumer = Consumer::new(env::var("SSO_CONSUMER_KEY")?);

	if let Ok(secret) = env::var("SSO_CONSUMER_SECRET") {
		consumer = consumer.with_secret(secret);
	}

	let mut session: ReqwestSession = HandshakeSession::new(descriptor, consumer)?;

	match env::var("SSO_PRIVATE_KEY_PATH") {
		Ok(path) => session.configure_signature("RSA", Some(&fs::read_to_string(path)?))?,
		Err(_) => session.configure_signature("HMAC", None)?,
	}

	let callback = Url::parse(&env::var("SSO_CALLBACK_URL")?)?;

	session.request_token(&callback, false, false).await?;

	println!("Sign in at: {}", session.redirect_target()?);

	let token = session.token().cloned().ok_or_else(|| eyre!("request token went missing"))?;
	let verifier = prompt("Paste oauth_verifier from the callback URL: ")?;
	let identity = session.check_login(&token.key, token.secret.expose(), &verifier).await?;

	println!("{:#}", identity.user().cloned().unwrap_or_default());

	Ok(())
}

fn prompt(label: &str) -> Result<String> {
	let mut line = String::new();

	println!("{label}");
	io::stdin().read_line(&mut line)?;

	Ok(line.trim().to_owned())
}
