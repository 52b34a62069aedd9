//! OAuth 1.0a request signing.
//!
//! `encode` holds the RFC 3986 percent-encoder every other piece shares, `canonical` turns a
//! method, URL, and parameter set into the signature base string, `method` implements the two
//! supported signature families, and `signer` glues them together with fresh protocol
//! parameters to produce a ready-to-send form body.

pub mod canonical;
pub mod encode;
pub mod method;
pub mod signer;

pub use canonical::*;
pub use encode::*;
pub use method::*;
pub use signer::*;
