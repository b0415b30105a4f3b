//! Provider descriptor data structures shared by the authenticator and its host.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, SETTING_APP_ID, SETTING_APP_SECRET},
};

/// Identifier the authenticator registers under.
pub const DEFAULT_PROVIDER_ID: &str = "direct-grant-wmp-authorization-code";
/// Name shown in the host's flow editor.
pub const DEFAULT_DISPLAY_TYPE: &str = "WeChat Mini Program authorization code";
/// Help text shown next to the authenticator in the host's flow editor.
pub const DEFAULT_HELP_TEXT: &str = "Signs users in with the authorization code obtained by a WeChat mini program. \
	 A user is created from the returned identity when no user is bound to it yet.";

/// Requirement levels an execution of this authenticator may be placed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Requirement {
	/// The execution must succeed for the flow to succeed.
	Required,
	/// The execution may be skipped.
	Alternative,
	/// The execution is not run.
	Disabled,
}

/// Value type of a configuration property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPropertyKind {
	/// Free-form single-line string.
	String,
}

/// Configuration property the host renders for each authenticator instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigProperty {
	/// Setting name used as the key in the host's configuration map.
	pub name: String,
	/// Label shown to administrators.
	pub label: String,
	/// Value type.
	pub kind: ConfigPropertyKind,
	/// Whether the host must treat the value as sensitive.
	pub secret: bool,
}
impl ConfigProperty {
	/// Declares a plain string property.
	pub fn string(name: impl Into<String>, label: impl Into<String>) -> Self {
		Self { name: name.into(), label: label.into(), kind: ConfigPropertyKind::String, secret: false }
	}

	/// Marks the property as sensitive.
	pub fn secret(mut self) -> Self {
		self.secret = true;

		self
	}
}

/// The `id` and `secret` properties every instance needs.
pub fn default_config_properties() -> Vec<ConfigProperty> {
	vec![
		ConfigProperty::string(SETTING_APP_ID, "AppId"),
		ConfigProperty::string(SETTING_APP_SECRET, "AppSecret").secret(),
	]
}

/// Immutable provider descriptor consumed by the authenticator and the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Display name.
	pub display_type: String,
	/// Help text.
	pub help_text: String,
	/// Optional reference category used by the host to group authenticators.
	pub reference_category: Option<String>,
	/// Requirement levels an execution may be placed at.
	pub requirement_choices: Vec<Requirement>,
	/// Whether instances carry configuration.
	pub configurable: bool,
	/// Whether a user must already be identified before this authenticator runs.
	pub requires_user: bool,
	/// Whether users may set this authenticator up themselves.
	pub user_setup_allowed: bool,
	/// Configuration properties rendered by the host.
	pub config_properties: Vec<ConfigProperty>,
	/// Code exchange endpoint.
	pub exchange_endpoint: Url,
}
impl ProviderDescriptor {
	/// Creates a builder seeded with the mini-program defaults.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Looks up a declared configuration property by name.
	pub fn config_property(&self, name: &str) -> Option<&ConfigProperty> {
		self.config_properties.iter().find(|property| property.name == name)
	}
}
