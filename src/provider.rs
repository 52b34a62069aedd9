//! Provider-facing configuration.
//!
//! `descriptor` exposes [`SsoDescriptor`], the validated base URL plus the path fragments
//! the provider serves its handshake endpoints under, and the helpers that compose them into
//! request and redirect URLs. `builder` assembles and validates descriptors.

pub mod builder;
pub mod descriptor;

pub use builder::*;
pub use descriptor::*;
