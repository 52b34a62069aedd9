//! RFC 3986 percent-encoding as OAuth 1.0a defines it.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except ALPHA / DIGIT / `-` / `.` / `_` / `~`.
const OAUTH_RESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `value` with uppercase hex digits; spaces become `%20`, never `+`.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_RESERVED).to_string()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unreserved_characters_pass_through() {
		assert_eq!(percent_encode("AZaz09-._~"), "AZaz09-._~");
	}

	#[test]
	fn reserved_characters_use_uppercase_hex() {
		assert_eq!(percent_encode("a b+c&d=e/f"), "a%20b%2Bc%26d%3De%2Ff");
		assert_eq!(percent_encode("*!'()"), "%2A%21%27%28%29");
	}

	#[test]
	fn multibyte_characters_encode_per_utf8_byte() {
		assert_eq!(percent_encode("é☃"), "%C3%A9%E2%98%83");
	}
}
