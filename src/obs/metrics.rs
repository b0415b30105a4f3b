// self
use crate::obs::{FlowStage, OutcomeLabel};

/// Records an attempt outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(outcome: OutcomeLabel, stage: FlowStage) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"wmp_auth_flow_total",
			"outcome" => outcome.as_str(),
			"stage" => stage.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (outcome, stage);
	}
}
