//! Per-flow authenticator configuration supplied by the host's configuration store.

// self
use crate::{
	_prelude::*,
	auth::{AppId, Secret},
	error::ConfigError,
};

/// Setting name carrying the mini-program application identifier.
pub const SETTING_APP_ID: &str = "id";
/// Setting name carrying the mini-program application secret.
pub const SETTING_APP_SECRET: &str = "secret";

/// Immutable credentials for one authentication attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAuthConfig")]
pub struct AuthConfig {
	/// Mini-program application identifier.
	#[serde(rename = "id")]
	pub app_id: AppId,
	/// Mini-program application secret (redacted in logs).
	#[serde(rename = "secret")]
	pub app_secret: Secret,
}
impl AuthConfig {
	/// Creates a configuration from already-validated parts.
	pub fn new(app_id: AppId, app_secret: Secret) -> Self {
		Self { app_id, app_secret }
	}

	/// Reads the `id` and `secret` settings from the host's string map.
	///
	/// Missing or blank values are reported as [`ConfigError::MissingSetting`]; an app id that
	/// fails identifier validation is reported as [`ConfigError::InvalidSetting`].
	pub fn from_settings<S>(settings: &HashMap<String, String, S>) -> Result<Self, ConfigError>
	where
		S: std::hash::BuildHasher,
	{
		Self::from_parts(
			settings.get(SETTING_APP_ID).map(String::as_str),
			settings.get(SETTING_APP_SECRET).map(String::as_str),
		)
	}

	fn from_parts(app_id: Option<&str>, app_secret: Option<&str>) -> Result<Self, ConfigError> {
		let app_id = non_blank(SETTING_APP_ID, app_id)?;
		let app_secret = non_blank(SETTING_APP_SECRET, app_secret)?;
		let app_id = AppId::new(app_id)
			.map_err(|source| ConfigError::InvalidSetting { name: SETTING_APP_ID, source })?;

		Ok(Self { app_id, app_secret: Secret::new(app_secret) })
	}
}

#[derive(Deserialize)]
struct RawAuthConfig {
	id: Option<String>,
	secret: Option<String>,
}
impl TryFrom<RawAuthConfig> for AuthConfig {
	type Error = ConfigError;

	fn try_from(raw: RawAuthConfig) -> Result<Self, Self::Error> {
		Self::from_parts(raw.id.as_deref(), raw.secret.as_deref())
	}
}

fn non_blank<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
	value.filter(|value| !value.trim().is_empty()).ok_or(ConfigError::MissingSetting { name })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn reads_id_and_secret_settings() {
		let config = AuthConfig::from_settings(&settings(&[("id", "wx1"), ("secret", "s")]))
			.expect("Complete settings should produce a configuration.");

		assert_eq!(config.app_id.as_ref(), "wx1");
		assert_eq!(config.app_secret.expose(), "s");
		assert!(!format!("{config:?}").contains("\"s\""));
	}

	#[test]
	fn missing_or_blank_settings_are_reported_by_name() {
		let err = AuthConfig::from_settings(&settings(&[("secret", "s")]))
			.expect_err("A missing app id should be rejected.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "id" }));

		let err = AuthConfig::from_settings(&settings(&[("id", "wx1"), ("secret", "  ")]))
			.expect_err("A blank secret should be rejected.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "secret" }));
	}

	#[test]
	fn invalid_app_id_is_rejected() {
		let err = AuthConfig::from_settings(&settings(&[("id", "wx 1"), ("secret", "s")]))
			.expect_err("An app id with whitespace should be rejected.");

		assert!(matches!(err, ConfigError::InvalidSetting { name: "id", .. }));
	}

	#[test]
	fn deserializes_from_host_json() {
		let config: AuthConfig = serde_json::from_str(r#"{"id":"wx1","secret":"s"}"#)
			.expect("Host JSON should deserialize into a configuration.");

		assert_eq!(config, AuthConfig::new(AppId::new("wx1").unwrap(), Secret::new("s")));
		assert!(serde_json::from_str::<AuthConfig>(r#"{"id":"wx1"}"#).is_err());
	}
}
