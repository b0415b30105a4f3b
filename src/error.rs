//! Authenticator-level error types shared across the exchange, resolver, and flow layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical authenticator error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// User directory failure.
	#[error("{0}")]
	Directory(
		#[from]
		#[source]
		crate::directory::DirectoryError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport or malformed-response failure before a provider verdict was reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A value failed identifier validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
}

/// Configuration and validation failures raised by the authenticator.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The host supplied no configuration for this flow instance.
	#[error("No authenticator configuration was supplied for this flow.")]
	MissingConfig,
	/// A required setting is absent or blank.
	#[error("Authenticator setting `{name}` is missing or blank.")]
	MissingSetting {
		/// Setting name as declared by the provider descriptor.
		name: &'static str,
	},
	/// A setting is present but does not validate.
	#[error("Authenticator setting `{name}` is invalid.")]
	InvalidSetting {
		/// Setting name as declared by the provider descriptor.
		name: &'static str,
		/// Underlying validation failure.
		#[source]
		source: crate::auth::IdentifierError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures reached before the provider rendered a verdict (network, IO, malformed payloads).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the code exchange endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the code exchange endpoint.")]
	Io(#[from] std::io::Error),
	/// The outbound request could not be assembled.
	#[error("Code exchange request could not be built.")]
	Request(#[from] oauth2::http::Error),
	/// The endpoint answered with a non-success HTTP status.
	#[error("Code exchange endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated body preview for diagnostics.
		body_preview: String,
	},
	/// The body is not valid JSON.
	#[error("Code exchange endpoint returned a body that is not JSON.")]
	InvalidJson {
		/// Syntax failure reported by the parser.
		#[source]
		source: serde_json::Error,
	},
	/// A response field carries a value of an unexpected shape.
	#[error("Code exchange endpoint returned malformed JSON.")]
	MalformedJson {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The body parsed but carried neither a usable identity nor an error code.
	#[error("Code exchange response is malformed: {reason}.")]
	MalformedResponse {
		/// Short description of what was missing or invalid.
		reason: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a [`TransportError::MalformedResponse`] from a reason string.
	pub fn malformed(reason: impl Into<String>) -> Self {
		Self::MalformedResponse { reason: reason.into() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::directory::DirectoryError;

	#[test]
	fn directory_error_converts_with_source() {
		let directory_error = DirectoryError::Backend { message: "ldap unreachable".into() };
		let error: Error = directory_error.clone().into();

		assert!(matches!(error, Error::Directory(_)));
		assert!(error.to_string().contains("ldap unreachable"));

		let source = StdError::source(&error)
			.expect("Authenticator error should expose the directory error as its source.");

		assert_eq!(source.to_string(), directory_error.to_string());
	}

	#[test]
	fn malformed_response_renders_reason() {
		let error: Error = TransportError::malformed("openid is missing").into();

		assert_eq!(error.to_string(), "Code exchange response is malformed: openid is missing.");
	}
}
