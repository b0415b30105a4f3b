// std
use std::fmt::Arguments;
// self
use crate::{
	_prelude::*,
	obs::{FlowStage, OutcomeLabel},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by authentication attempts.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provider id and the call site.
	pub fn new(provider: &str, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("wmp_auth.flow", provider, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug-level progress event for `stage`.
pub fn note(stage: FlowStage, message: Arguments<'_>) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(stage = stage.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, message);
	}
}

/// Emits the terminal event of an attempt at a level matching its outcome.
///
/// `detail` must never contain the application secret or the login code.
pub fn trace_outcome(outcome: OutcomeLabel, stage: FlowStage, event: &str, detail: &str) {
	#[cfg(feature = "tracing")]
	{
		let stage = stage.as_str();

		match outcome {
			OutcomeLabel::Attempt | OutcomeLabel::Bound =>
				tracing::info!(outcome = outcome.as_str(), stage, event_label = event, "{detail}"),
			OutcomeLabel::Rejected =>
				tracing::warn!(outcome = outcome.as_str(), stage, event_label = event, "{detail}"),
			OutcomeLabel::Fatal =>
				tracing::error!(outcome = outcome.as_str(), stage, event_label = event, "{detail}"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (outcome, stage, event, detail);
	}
}
