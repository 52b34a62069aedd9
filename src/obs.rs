//! Optional observability helpers for handshake steps.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth1_sso.handshake` with the `step` and
//!   `stage` fields, plus a warning event for every failed step.
//! - Enable `metrics` to increment the `oauth1_sso_handshake_total` counter for every
//!   attempt/success/failure, labeled by `step` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Handshake steps observed by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeStep {
	/// Request-token call.
	RequestToken,
	/// Verifier exchange on callback.
	CheckLogin,
}
impl HandshakeStep {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeStep::RequestToken => "request_token",
			HandshakeStep::CheckLogin => "check_login",
		}
	}
}
impl Display for HandshakeStep {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
	/// Entry to a handshake step.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StepOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepOutcome::Attempt => "attempt",
			StepOutcome::Success => "success",
			StepOutcome::Failure => "failure",
		}
	}
}
impl Display for StepOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
