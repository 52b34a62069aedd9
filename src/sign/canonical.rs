//! Signature base string construction (RFC 5849 section 3.4.1).

// self
use crate::{_prelude::*, error::ConfigError, sign::percent_encode};

/// Ordered parameter set with unique keys.
///
/// Insertion order is kept for inspection only; every serialized form sorts by encoded key,
/// then encoded value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);
impl Parameters {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts `key`, replacing the value in place when the key already exists.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		let value = value.into();

		match self.0.iter_mut().find(|(existing, _)| *existing == key) {
			Some(slot) => slot.1 = value,
			None => self.0.push((key, value)),
		}
	}

	/// Returns the value stored for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(existing, _)| existing == key).map(|(_, value)| value.as_str())
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no parameter is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Serializes the set as sorted, percent-encoded `key=value` pairs joined by `&`.
	pub fn normalized(&self) -> String {
		normalize_pairs(self.iter())
	}
}
impl<K, V> Extend<(K, V)> for Parameters
where
	K: Into<String>,
	V: Into<String>,
{
	fn extend<I>(&mut self, iter: I)
	where
		I: IntoIterator<Item = (K, V)>,
	{
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}
impl<K, V> FromIterator<(K, V)> for Parameters
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut params = Self::new();

		params.extend(iter);

		params
	}
}

/// Output of [`CanonicalRequest::build`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalRequest {
	/// Uppercased HTTP method.
	pub method: String,
	/// Normalized base URL (scheme, host, non-default port, path).
	pub base_url: String,
	/// `METHOD&enc(base_url)&enc(normalized parameters)`.
	pub base_string: String,
	/// Sorted, percent-encoded form body made of the supplied parameters.
	pub encoded_body: String,
}
impl CanonicalRequest {
	/// Builds the base string and form body for `method` + `url` + `params`.
	///
	/// Query parameters already present on `url` take part in the base string but not in the
	/// body. Pure: no clock, randomness, or I/O.
	pub fn build(method: &str, url: &Url, params: &Parameters) -> Result<Self> {
		let method = normalize_method(method)?;
		let base_url = normalize_url(url)?;
		let query = url.query_pairs().into_owned().collect::<Vec<_>>();
		let signed = normalize_pairs(
			params.iter().chain(query.iter().map(|(key, value)| (key.as_str(), value.as_str()))),
		);
		let base_string =
			format!("{method}&{}&{}", percent_encode(&base_url), percent_encode(&signed));

		Ok(Self { method, base_url, base_string, encoded_body: params.normalized() })
	}
}

fn normalize_pairs<'a, I>(pairs: I) -> String
where
	I: Iterator<Item = (&'a str, &'a str)>,
{
	let mut encoded =
		pairs.map(|(key, value)| (percent_encode(key), percent_encode(value))).collect::<Vec<_>>();

	// `sort_by` is stable, so full ties keep insertion order.
	encoded.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

	encoded.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&")
}

fn normalize_method(method: &str) -> Result<String> {
	if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
		return Err(ConfigError::InvalidMethod { method: method.to_owned() }.into());
	}

	Ok(method.to_ascii_uppercase())
}

fn normalize_url(url: &Url) -> Result<String> {
	let host = match url.host_str() {
		Some(host) if !url.cannot_be_a_base() => host,
		_ => return Err(ConfigError::InvalidBaseUrl { url: url.to_string() }.into()),
	};
	let mut normalized = format!("{}://{}", url.scheme(), host.to_ascii_lowercase());

	// `Url::port` already hides the scheme's default port.
	if let Some(port) = url.port() {
		normalized.push(':');
		normalized.push_str(&port.to_string());
	}

	normalized.push_str(url.path());

	Ok(normalized)
}
