//! Consumer and token credentials plus the redacting secret wrapper they share.

pub mod consumer;
pub mod secret;
pub mod token;

pub use consumer::*;
pub use secret::*;
pub use token::*;
