//! Optional observability helpers for authentication attempts.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run each attempt inside a span named `wmp_auth.flow` (fields
//!   `provider` and `stage`) and to emit events when an attempt binds, is rejected, or fails.
//! - Enable `metrics` to increment the `wmp_auth_flow_total` counter for every
//!   attempt/bound/rejected/fatal outcome, labeled by `outcome` + `stage`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of one authentication attempt, in the only order they can be reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlowStage {
	/// Attempt received; configuration not yet validated.
	Start,
	/// Configuration accepted; exchange request built.
	Configured,
	/// Exchange endpoint answered with a body.
	Exchanged,
	/// Body classified into a provider verdict.
	Classified,
	/// Identity bound to a directory user.
	Resolved,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Start => "start",
			FlowStage::Configured => "configured",
			FlowStage::Exchanged => "exchanged",
			FlowStage::Classified => "classified",
			FlowStage::Resolved => "resolved",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeLabel {
	/// Entry to the authenticator.
	Attempt,
	/// A user was bound.
	Bound,
	/// The provider rejected the code.
	Rejected,
	/// Configuration, transport, or directory failure.
	Fatal,
}
impl OutcomeLabel {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OutcomeLabel::Attempt => "attempt",
			OutcomeLabel::Bound => "bound",
			OutcomeLabel::Rejected => "rejected",
			OutcomeLabel::Fatal => "fatal",
		}
	}
}
impl Display for OutcomeLabel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn stages_are_ordered() {
		assert!(FlowStage::Start < FlowStage::Configured);
		assert!(FlowStage::Configured < FlowStage::Exchanged);
		assert!(FlowStage::Exchanged < FlowStage::Classified);
		assert!(FlowStage::Classified < FlowStage::Resolved);
		assert_eq!(FlowStage::Classified.to_string(), "classified");
		assert_eq!(OutcomeLabel::Rejected.to_string(), "rejected");
	}
}
