//! Code exchange client: one `GET` against the provider's code-to-session endpoint.
//!
//! [`CodeExchangeClient::exchange`] returns the raw body or a [`TransportError`];
//! [`classify`] turns a body into an [`ExchangeOutcome`]. The client never retries because
//! login codes are single-use: a failed attempt has to restart with a fresh code.

pub mod classify;

pub use classify::*;

// std
use std::io;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError,
	http::{Method, Request, header::ACCEPT},
};
// self
use crate::{
	_prelude::*,
	auth::{AppId, AuthConfig, OpenId, Secret, UnionId},
	error::TransportError,
	http::ExchangeHttpClient,
	obs::{self, FlowStage},
};

/// Production code-to-session endpoint.
pub const DEFAULT_EXCHANGE_ENDPOINT: &str = "https://api.weixin.qq.com/sns/jscode2session";
/// Fixed `grant_type` marker sent with every exchange.
pub const GRANT_TYPE: &str = "authorization_code";

const BODY_PREVIEW_LIMIT: usize = 256;

/// Parameters of one code exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeRequest {
	/// Mini-program application identifier.
	pub app_id: AppId,
	/// Mini-program application secret.
	pub app_secret: Secret,
	/// One-time login code; forwarded even when empty.
	pub code: Secret,
}
impl ExchangeRequest {
	/// Pairs the flow configuration with the caller-supplied code.
	pub fn new(config: &AuthConfig, code: impl Into<String>) -> Self {
		Self {
			app_id: config.app_id.clone(),
			app_secret: config.app_secret.clone(),
			code: Secret::new(code),
		}
	}

	/// Appends the four exchange query parameters to `endpoint`.
	///
	/// The returned URL embeds the secret and must never be logged.
	pub fn to_url(&self, endpoint: &Url) -> Url {
		let mut url = endpoint.clone();

		url.query_pairs_mut()
			.append_pair("appid", &self.app_id)
			.append_pair("secret", self.app_secret.expose())
			.append_pair("js_code", self.code.expose())
			.append_pair("grant_type", GRANT_TYPE);

		url
	}
}

/// Verdict of one exchange attempt; exactly one variant is produced per attempt.
#[derive(Debug)]
pub enum ExchangeOutcome {
	/// The provider returned a usable identity.
	Success {
		/// Application-scoped identity.
		open_id: OpenId,
		/// Cross-application identity, when the provider disclosed one.
		union_id: Option<UnionId>,
	},
	/// The provider rejected the code.
	ProviderError {
		/// Provider error code (`errcode`).
		code: String,
		/// Provider error message (`errmsg`), when present.
		message: Option<String>,
	},
	/// No provider verdict was reached (network failure or malformed payload).
	TransportError {
		/// Underlying failure.
		cause: TransportError,
	},
}
impl ExchangeOutcome {
	/// Stable label suitable for log fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Success { .. } => "success",
			Self::ProviderError { .. } => "provider_error",
			Self::TransportError { .. } => "transport_error",
		}
	}
}
impl From<TransportError> for ExchangeOutcome {
	fn from(cause: TransportError) -> Self {
		Self::TransportError { cause }
	}
}

/// Issues code exchanges against a fixed endpoint through an [`ExchangeHttpClient`].
pub struct CodeExchangeClient<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	http_client: Arc<C>,
	endpoint: Url,
}
impl<C> CodeExchangeClient<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	/// Creates a client for `endpoint`.
	pub fn new(http_client: impl Into<Arc<C>>, endpoint: Url) -> Self {
		Self { http_client: http_client.into(), endpoint }
	}

	/// Endpoint the client calls.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Performs the exchange and returns the raw response body.
	///
	/// Request construction failures, network failures, and non-2xx statuses are
	/// [`TransportError`]s.
	pub async fn exchange(&self, request: &ExchangeRequest) -> Result<Vec<u8>, TransportError> {
		obs::note(
			FlowStage::Configured,
			format_args!(
				"Exchanging login code for app {} (code fingerprint {}).",
				request.app_id,
				request.code.fingerprint()
			),
		);

		let http_request = Request::builder()
			.method(Method::GET)
			.uri(request.to_url(&self.endpoint).as_str())
			.header(ACCEPT, "application/json")
			.body(Vec::new())?;
		let handle = self.http_client.handle();
		let response = handle.call(http_request).await.map_err(map_http_client_error)?;
		let status = response.status();

		if !status.is_success() {
			return Err(TransportError::Status {
				status: status.as_u16(),
				body_preview: truncate_preview(&String::from_utf8_lossy(response.body())),
			});
		}

		Ok(response.into_body())
	}

	/// Performs the exchange and classifies the result.
	pub async fn exchange_and_classify(&self, request: &ExchangeRequest) -> ExchangeOutcome {
		match self.exchange(request).await {
			Ok(body) => classify(&body),
			Err(cause) => cause.into(),
		}
	}
}
impl<C> Clone for CodeExchangeClient<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone(), endpoint: self.endpoint.clone() }
	}
}
impl<C> Debug for CodeExchangeClient<C>
where
	C: ?Sized + ExchangeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CodeExchangeClient").field("endpoint", &self.endpoint.as_str()).finish()
	}
}

fn map_http_client_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner),
		HttpClientError::Http(inner) => TransportError::Request(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Io(io::Error::other(message)),
		_ => TransportError::Io(io::Error::other("unrecognized HTTP client failure")),
	}
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}
