// std
use std::net::IpAddr;
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProviderId},
	exchange::DEFAULT_EXCHANGE_ENDPOINT,
	provider::{
		ConfigProperty, DEFAULT_DISPLAY_TYPE, DEFAULT_HELP_TEXT, DEFAULT_PROVIDER_ID,
		ProviderDescriptor, Requirement, default_config_properties,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Provider identifier failed validation.
	#[error("Provider identifier is invalid.")]
	InvalidId(#[from] IdentifierError),
	/// Endpoint could not be parsed.
	#[error("The exchange endpoint is not a valid URL: {url}.")]
	InvalidEndpoint {
		/// Endpoint string that failed to parse.
		url: String,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The exchange endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The endpoint already carries query parameters that would be sent to the provider.
	#[error("The exchange endpoint must not carry a query string: {url}.")]
	EndpointHasQuery {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// At least one requirement choice must be offered.
	#[error("Descriptor must offer at least one requirement choice.")]
	NoRequirementChoices,
	/// Two configuration properties share a name.
	#[error("Configuration property `{name}` is declared twice.")]
	DuplicateConfigProperty {
		/// Duplicated property name.
		name: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: String,
	/// Display name.
	pub display_type: String,
	/// Help text.
	pub help_text: String,
	/// Optional reference category.
	pub reference_category: Option<String>,
	/// Requirement levels an execution may be placed at.
	pub requirement_choices: Vec<Requirement>,
	/// Configuration properties rendered by the host.
	pub config_properties: Vec<ConfigProperty>,
	/// Code exchange endpoint; the production endpoint when unset.
	pub exchange_endpoint: Option<Url>,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the mini-program defaults.
	pub fn new() -> Self {
		Self {
			id: DEFAULT_PROVIDER_ID.into(),
			display_type: DEFAULT_DISPLAY_TYPE.into(),
			help_text: DEFAULT_HELP_TEXT.into(),
			reference_category: None,
			requirement_choices: vec![Requirement::Required],
			config_properties: default_config_properties(),
			exchange_endpoint: None,
		}
	}

	/// Overrides the provider identifier.
	pub fn id(mut self, id: impl Into<String>) -> Self {
		self.id = id.into();

		self
	}

	/// Overrides the display name.
	pub fn display_type(mut self, display_type: impl Into<String>) -> Self {
		self.display_type = display_type.into();

		self
	}

	/// Overrides the help text.
	pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
		self.help_text = help_text.into();

		self
	}

	/// Sets the reference category.
	pub fn reference_category(mut self, category: impl Into<String>) -> Self {
		self.reference_category = Some(category.into());

		self
	}

	/// Overrides the code exchange endpoint.
	pub fn exchange_endpoint(mut self, url: Url) -> Self {
		self.exchange_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let exchange_endpoint = match self.exchange_endpoint {
			Some(url) => url,
			None => Url::parse(DEFAULT_EXCHANGE_ENDPOINT).map_err(|_| {
				ProviderDescriptorError::InvalidEndpoint { url: DEFAULT_EXCHANGE_ENDPOINT.into() }
			})?,
		};
		let descriptor = ProviderDescriptor {
			id: ProviderId::new(self.id)?,
			display_type: self.display_type,
			help_text: self.help_text,
			reference_category: self.reference_category,
			requirement_choices: self.requirement_choices,
			configurable: true,
			requires_user: false,
			user_setup_allowed: false,
			config_properties: self.config_properties,
			exchange_endpoint,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}
impl Default for ProviderDescriptorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if self.requirement_choices.is_empty() {
			return Err(ProviderDescriptorError::NoRequirementChoices);
		}

		for (idx, property) in self.config_properties.iter().enumerate() {
			if self.config_properties[..idx].iter().any(|earlier| earlier.name == property.name) {
				return Err(ProviderDescriptorError::DuplicateConfigProperty {
					name: property.name.clone(),
				});
			}
		}

		validate_endpoint(&self.exchange_endpoint)
	}
}

fn validate_endpoint(url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.query().is_some() {
		return Err(ProviderDescriptorError::EndpointHasQuery { url: url.to_string() });
	}

	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ProviderDescriptorError::InsecureEndpoint { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host_str() {
		Some("localhost") => true,
		Some(host) => host
			.trim_start_matches('[')
			.trim_end_matches(']')
			.parse::<IpAddr>()
			.is_ok_and(|ip| ip.is_loopback()),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse endpoint fixture.")
	}

	#[test]
	fn defaults_describe_the_mini_program_authenticator() {
		let descriptor =
			ProviderDescriptor::builder().build().expect("Default descriptor should build.");

		assert_eq!(descriptor.id.as_ref(), "direct-grant-wmp-authorization-code");
		assert_eq!(descriptor.exchange_endpoint.as_str(), DEFAULT_EXCHANGE_ENDPOINT);
		assert_eq!(descriptor.requirement_choices, vec![Requirement::Required]);
		assert!(descriptor.configurable);
		assert!(!descriptor.requires_user);
		assert!(!descriptor.user_setup_allowed);
		assert_eq!(descriptor.reference_category, None);

		let secret = descriptor.config_property("secret").expect("secret should be declared");

		assert!(secret.secret);
		assert_eq!(secret.label, "AppSecret");
		assert!(!descriptor.config_property("id").expect("id should be declared").secret);
	}

	#[test]
	fn rejects_insecure_remote_endpoints() {
		let err = ProviderDescriptor::builder()
			.exchange_endpoint(url("http://api.example.com/sns/jscode2session"))
			.build()
			.expect_err("Plain HTTP to a remote host should be rejected.");

		assert!(matches!(err, ProviderDescriptorError::InsecureEndpoint { .. }));
	}

	#[test]
	fn allows_plain_http_on_loopback() {
		for endpoint in [
			"http://127.0.0.1:8080/sns/jscode2session",
			"http://localhost:8080/sns/jscode2session",
			"http://[::1]:8080/sns/jscode2session",
		] {
			ProviderDescriptor::builder()
				.exchange_endpoint(url(endpoint))
				.build()
				.unwrap_or_else(|e| panic!("{endpoint} should be accepted: {e}"));
		}
	}

	#[test]
	fn rejects_endpoint_with_query() {
		let err = ProviderDescriptor::builder()
			.exchange_endpoint(url("https://api.example.com/sns/jscode2session?appid=x"))
			.build()
			.expect_err("Endpoints with a query string should be rejected.");

		assert!(matches!(err, ProviderDescriptorError::EndpointHasQuery { .. }));
	}

	#[test]
	fn rejects_invalid_id() {
		let err = ProviderDescriptor::builder()
			.id("with space")
			.build()
			.expect_err("Identifiers with whitespace should be rejected.");

		assert!(matches!(err, ProviderDescriptorError::InvalidId(_)));
	}

	#[test]
	fn rejects_duplicate_properties() {
		let mut builder = ProviderDescriptor::builder();

		builder.config_properties.push(ConfigProperty::string("id", "Duplicate"));

		assert!(matches!(
			builder.build(),
			Err(ProviderDescriptorError::DuplicateConfigProperty { name }) if name == "id"
		));
	}
}
