//! Authentication flow orchestration: configuration → exchange → classify → resolve.
//!
//! [`WmpAuthenticator::run`] walks one attempt through
//! `Start → Configured → Exchanged → Classified → Resolved` and turns the result into a
//! [`FlowOutcome`] the host can render as a challenge response and an event-log entry.
//! Every attempt is independent; nothing but the directory and the resolver's idle-pruned
//! guards outlives it. Codes are single-use, so no stage is ever retried.

// self
use crate::{
	_prelude::*,
	auth::{AuthConfig, RealmId},
	directory::{UserDirectory, UserIdentity},
	error::{ConfigError, TransportError},
	exchange::{CodeExchangeClient, ExchangeOutcome, ExchangeRequest, classify},
	http::ExchangeHttpClient,
	obs::{self, FlowSpan, FlowStage, OutcomeLabel},
	provider::ProviderDescriptor,
	resolve::IdentityResolver,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// HTTP status signaled when the provider rejects the code.
pub const STATUS_UNAUTHORIZED: u16 = 401;
/// HTTP status signaled for configuration, transport, and directory failures.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Event label recorded when the flow instance carries no usable configuration.
pub const EVENT_INVALID_CONFIG: &str = "invalid_authenticator_config";
/// Event label prefix recorded when the provider rejects the code; the provider code follows.
pub const EVENT_IDENTITY_REJECTED: &str = "wmp_identity_rejected";
/// Event label recorded for transport and directory failures.
pub const EVENT_INTERNAL_ERROR: &str = "internal_error";

const TITLE_CONFIG: &str = "Service configuration error";
const DETAIL_MISSING_CONFIG: &str = "Mini program login is not configured.";
const TITLE_IDENTITY: &str = "Failed to obtain mini program user identity";
const TITLE_DIRECTORY: &str = "Failed to bind mini program user";

/// Boxed future returned by [`Authenticator::authenticate`].
pub type FlowFuture<'a> = Pin<Box<dyn Future<Output = FlowOutcome> + 'a + Send>>;

/// Capability set the host orchestrator drives.
pub trait Authenticator
where
	Self: Send + Sync,
{
	/// Runs one authentication attempt for `code` under the flow instance's `config`.
	fn authenticate<'a>(
		&'a self,
		realm: &'a RealmId,
		config: Option<&'a AuthConfig>,
		code: &'a str,
	) -> FlowFuture<'a>;

	/// Registration metadata the host shows in its flow editor.
	fn describe(&self) -> &ProviderDescriptor;
}

/// Classification the host's flow engine uses for a failed execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowError {
	/// Configuration, transport, or directory failure.
	InternalError,
	/// The provider refused to vouch for the presented code.
	InvalidUser,
}
impl FlowError {
	/// Stable label suitable for event logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowError::InternalError => "internal_error",
			FlowError::InvalidUser => "invalid_user",
		}
	}
}
impl Display for FlowError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Challenge response and audit entry for a failed attempt.
///
/// Neither `detail` nor `event` ever contains the application secret or the login code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowFailure {
	/// HTTP-style status code.
	pub status: u16,
	/// Flow-engine classification.
	pub error: FlowError,
	/// Event-log error label.
	pub event: String,
	/// Short title for the challenge response.
	pub title: String,
	/// Diagnostic detail for the challenge response.
	pub detail: String,
	/// Last stage the attempt reached.
	pub stage: FlowStage,
}

/// Terminal state of one authentication attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowOutcome {
	/// The external identity is bound to this user.
	Bound {
		/// Existing or freshly created user.
		user: UserIdentity,
	},
	/// The provider rejected the code.
	Rejected(FlowFailure),
	/// The attempt could not reach a verdict.
	Fatal(FlowFailure),
}
impl FlowOutcome {
	fn missing_config() -> Self {
		Self::Fatal(FlowFailure {
			status: STATUS_INTERNAL_ERROR,
			error: FlowError::InternalError,
			event: EVENT_INVALID_CONFIG.into(),
			title: TITLE_CONFIG.into(),
			detail: DETAIL_MISSING_CONFIG.into(),
			stage: FlowStage::Start,
		})
	}

	fn invalid_config(err: &ConfigError) -> Self {
		Self::Fatal(FlowFailure {
			status: STATUS_INTERNAL_ERROR,
			error: FlowError::InternalError,
			event: EVENT_INVALID_CONFIG.into(),
			title: TITLE_CONFIG.into(),
			detail: err.to_string(),
			stage: FlowStage::Start,
		})
	}

	fn transport(stage: FlowStage, cause: &TransportError) -> Self {
		Self::Fatal(FlowFailure {
			status: STATUS_INTERNAL_ERROR,
			error: FlowError::InternalError,
			event: EVENT_INTERNAL_ERROR.into(),
			title: TITLE_IDENTITY.into(),
			detail: cause.to_string(),
			stage,
		})
	}

	fn rejected(code: &str, message: Option<&str>) -> Self {
		let detail = match message {
			Some(message) => format!("errcode: {code} errmsg: {message}"),
			None => format!("errcode: {code}"),
		};

		Self::Rejected(FlowFailure {
			status: STATUS_UNAUTHORIZED,
			error: FlowError::InvalidUser,
			event: format!("{EVENT_IDENTITY_REJECTED}: {code}"),
			title: TITLE_IDENTITY.into(),
			detail,
			stage: FlowStage::Classified,
		})
	}

	fn directory(err: &Error) -> Self {
		Self::Fatal(FlowFailure {
			status: STATUS_INTERNAL_ERROR,
			error: FlowError::InternalError,
			event: EVENT_INTERNAL_ERROR.into(),
			title: TITLE_DIRECTORY.into(),
			detail: err.to_string(),
			stage: FlowStage::Classified,
		})
	}

	/// Bound user, if the attempt succeeded.
	pub fn user(&self) -> Option<&UserIdentity> {
		match self {
			Self::Bound { user } => Some(user),
			_ => None,
		}
	}

	/// Challenge details, if the attempt failed.
	pub fn failure(&self) -> Option<&FlowFailure> {
		match self {
			Self::Bound { .. } => None,
			Self::Rejected(failure) | Self::Fatal(failure) => Some(failure),
		}
	}

	/// HTTP-style status to signal, if the attempt failed.
	pub fn status(&self) -> Option<u16> {
		self.failure().map(|failure| failure.status)
	}

	/// Last stage the attempt reached.
	pub fn stage(&self) -> FlowStage {
		match self {
			Self::Bound { .. } => FlowStage::Resolved,
			Self::Rejected(failure) | Self::Fatal(failure) => failure.stage,
		}
	}

	/// Observability label for this outcome.
	pub const fn label(&self) -> OutcomeLabel {
		match self {
			Self::Bound { .. } => OutcomeLabel::Bound,
			Self::Rejected(_) => OutcomeLabel::Rejected,
			Self::Fatal(_) => OutcomeLabel::Fatal,
		}
	}
}

/// Mini-program authorization-code authenticator.
///
/// Owns the exchange client, the identity resolver, and the descriptor it was registered
/// with. Clones share the HTTP client, the directory, and the resolver's guards.
pub struct WmpAuthenticator<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	exchange: CodeExchangeClient<C>,
	resolver: IdentityResolver,
	descriptor: ProviderDescriptor,
}
impl<C> WmpAuthenticator<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	/// Creates an authenticator that reuses the caller-provided transport.
	pub fn with_http_client(
		directory: Arc<dyn UserDirectory>,
		descriptor: ProviderDescriptor,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			exchange: CodeExchangeClient::new(http_client, descriptor.exchange_endpoint.clone()),
			resolver: IdentityResolver::new(directory),
			descriptor,
		}
	}

	/// Descriptor the authenticator was built from.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Exchange client used for every attempt.
	pub fn exchange_client(&self) -> &CodeExchangeClient<C> {
		&self.exchange
	}

	/// Identity resolver used for every attempt.
	pub fn resolver(&self) -> &IdentityResolver {
		&self.resolver
	}

	/// Runs one attempt with configuration read from the host's string settings map.
	///
	/// Missing or blank `id`/`secret` settings end the attempt as a configuration failure
	/// before any exchange is made.
	pub async fn run_with_settings<S>(
		&self,
		realm: &RealmId,
		settings: Option<&HashMap<String, String, S>>,
		code: &str,
	) -> FlowOutcome
	where
		S: std::hash::BuildHasher,
	{
		match settings.map(AuthConfig::from_settings).transpose() {
			Ok(config) => self.run(realm, config.as_ref(), code).await,
			Err(err) => {
				obs::record_flow_outcome(OutcomeLabel::Attempt, FlowStage::Start);

				self.finish(FlowOutcome::invalid_config(&err))
			},
		}
	}

	/// Runs one attempt.
	pub async fn run(
		&self,
		realm: &RealmId,
		config: Option<&AuthConfig>,
		code: &str,
	) -> FlowOutcome {
		let span = FlowSpan::new(&self.descriptor.id, "run");

		obs::record_flow_outcome(OutcomeLabel::Attempt, FlowStage::Start);

		let outcome = span.instrument(self.drive(realm, config, code)).await;

		self.finish(outcome)
	}

	async fn drive(
		&self,
		realm: &RealmId,
		config: Option<&AuthConfig>,
		code: &str,
	) -> FlowOutcome {
		let Some(config) = config else {
			return FlowOutcome::missing_config();
		};
		let request = ExchangeRequest::new(config, code);
		let body = match self.exchange.exchange(&request).await {
			Ok(body) => body,
			Err(cause) => return FlowOutcome::transport(FlowStage::Configured, &cause),
		};

		obs::note(FlowStage::Exchanged, format_args!("Received {} byte body.", body.len()));

		let (open_id, union_id) = match classify(&body) {
			ExchangeOutcome::Success { open_id, union_id } => (open_id, union_id),
			ExchangeOutcome::ProviderError { code, message } =>
				return FlowOutcome::rejected(&code, message.as_deref()),
			ExchangeOutcome::TransportError { cause } =>
				return FlowOutcome::transport(FlowStage::Exchanged, &cause),
		};

		obs::note(FlowStage::Classified, format_args!("Provider vouched for openid {open_id}."));

		match self
			.resolver
			.resolve_or_create(realm, &config.app_id, &open_id, union_id.as_ref())
			.await
		{
			Ok(user) => FlowOutcome::Bound { user },
			Err(err) => FlowOutcome::directory(&err),
		}
	}

	fn finish(&self, outcome: FlowOutcome) -> FlowOutcome {
		let label = outcome.label();
		let stage = outcome.stage();

		obs::record_flow_outcome(label, stage);

		match &outcome {
			FlowOutcome::Bound { user } =>
				obs::trace_outcome(label, stage, "login", &format!("Bound user {}.", user.id)),
			FlowOutcome::Rejected(failure) | FlowOutcome::Fatal(failure) =>
				obs::trace_outcome(label, stage, &failure.event, &failure.detail),
		}

		outcome
	}
}
#[cfg(feature = "reqwest")]
impl WmpAuthenticator<ReqwestHttpClient> {
	/// Creates an authenticator backed by a default reqwest client.
	///
	/// Use [`WmpAuthenticator::with_http_client`] to supply a client with host-specific
	/// timeouts or TLS settings.
	pub fn new(directory: Arc<dyn UserDirectory>, descriptor: ProviderDescriptor) -> Self {
		Self::with_http_client(directory, descriptor, ReqwestHttpClient::default())
	}
}
impl<C> Authenticator for WmpAuthenticator<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	fn authenticate<'a>(
		&'a self,
		realm: &'a RealmId,
		config: Option<&'a AuthConfig>,
		code: &'a str,
	) -> FlowFuture<'a> {
		Box::pin(self.run(realm, config, code))
	}

	fn describe(&self) -> &ProviderDescriptor {
		&self.descriptor
	}
}
impl<C> Clone for WmpAuthenticator<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			exchange: self.exchange.clone(),
			resolver: self.resolver.clone(),
			descriptor: self.descriptor.clone(),
		}
	}
}
impl<C> Debug for WmpAuthenticator<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("WmpAuthenticator")
			.field("provider", &self.descriptor.id)
			.field("exchange", &self.exchange)
			.field("resolver", &self.resolver)
			.finish()
	}
}
