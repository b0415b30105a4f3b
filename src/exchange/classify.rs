//! Pure classification of code-to-session responses.

// crates.io
use serde::{
	Deserializer,
	de::{self, Visitor},
};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{OpenId, UnionId},
	error::TransportError,
	exchange::ExchangeOutcome,
};

/// Classifies a raw response body.
///
/// A non-blank `errcode` wins over any identity fields. Without one, a non-blank `openid`
/// is required; a body carrying neither is reported as a malformed response instead of an
/// empty identity.
pub fn classify(body: &[u8]) -> ExchangeOutcome {
	match parse(body) {
		Ok(payload) => payload.into_outcome(),
		Err(cause) => cause.into(),
	}
}

#[derive(Debug, Default, Deserialize)]
struct Code2SessionPayload {
	#[serde(default)]
	openid: FieldText,
	#[serde(default)]
	unionid: FieldText,
	#[serde(default)]
	errcode: FieldText,
	#[serde(default)]
	errmsg: FieldText,
}
impl Code2SessionPayload {
	fn into_outcome(self) -> ExchangeOutcome {
		if let Some(code) = self.errcode.non_blank() {
			return ExchangeOutcome::ProviderError { code, message: self.errmsg.non_blank() };
		}

		let Some(open_id) = self.openid.non_blank() else {
			return TransportError::malformed("response carries neither errcode nor openid").into();
		};
		let open_id = match OpenId::new(open_id) {
			Ok(open_id) => open_id,
			Err(e) => return TransportError::malformed(format!("openid is invalid: {e}")).into(),
		};
		let union_id = match self.unionid.non_blank().map(UnionId::new).transpose() {
			Ok(union_id) => union_id,
			Err(e) => return TransportError::malformed(format!("unionid is invalid: {e}")).into(),
		};

		ExchangeOutcome::Success { open_id, union_id }
	}
}

/// Scalar field rendered as text; `null` and missing fields are absent.
#[derive(Debug, Default)]
struct FieldText(Option<String>);
impl FieldText {
	fn non_blank(self) -> Option<String> {
		self.0.map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
	}
}
impl<'de> Deserialize<'de> for FieldText {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(FieldTextVisitor)
	}
}

struct FieldTextVisitor;
impl<'de> Visitor<'de> for FieldTextVisitor {
	type Value = FieldText;

	fn expecting(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("a string, number, boolean, or null")
	}

	fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Ok(FieldText(Some(value.to_owned())))
	}

	fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Ok(FieldText(Some(value)))
	}

	fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Ok(FieldText(Some(value.to_string())))
	}

	fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Ok(FieldText(Some(value.to_string())))
	}

	fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Ok(FieldText(Some(value.to_string())))
	}

	fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Ok(FieldText(Some(value.to_string())))
	}

	fn visit_unit<E>(self) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Ok(FieldText(None))
	}

	fn visit_none<E>(self) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Ok(FieldText(None))
	}

	fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(self)
	}
}

fn parse(body: &[u8]) -> Result<Code2SessionPayload, TransportError> {
	let value: Value =
		serde_json::from_slice(body).map_err(|source| TransportError::InvalidJson { source })?;

	if !value.is_object() {
		return Err(TransportError::malformed("body is not a JSON object"));
	}

	serde_path_to_error::deserialize(value).map_err(|source| TransportError::MalformedJson { source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn outcome(body: &str) -> ExchangeOutcome {
		classify(body.as_bytes())
	}

	#[test]
	fn identity_with_union_id_is_success() {
		let ExchangeOutcome::Success { open_id, union_id } =
			outcome(r#"{"openid":"o-123","unionid":"u-9"}"#)
		else {
			panic!("A body with openid should classify as success.");
		};

		assert_eq!(open_id.as_ref(), "o-123");
		assert_eq!(union_id.as_deref(), Some("u-9"));
	}

	#[test]
	fn missing_or_blank_union_id_is_absent() {
		for body in [
			r#"{"openid":"o-1"}"#,
			r#"{"openid":"o-1","unionid":null}"#,
			r#"{"openid":"o-1","unionid":"  "}"#,
		] {
			assert!(
				matches!(outcome(body), ExchangeOutcome::Success { union_id: None, .. }),
				"{body} should classify as success without a union id."
			);
		}
	}

	#[test]
	fn error_code_is_provider_error() {
		let ExchangeOutcome::ProviderError { code, message } =
			outcome(r#"{"errcode":"40029","errmsg":"invalid code"}"#)
		else {
			panic!("A body with errcode should classify as provider error.");
		};

		assert_eq!(code, "40029");
		assert_eq!(message.as_deref(), Some("invalid code"));
	}

	#[test]
	fn numeric_error_code_without_message() {
		let ExchangeOutcome::ProviderError { code, message } = outcome(r#"{"errcode":45011}"#)
		else {
			panic!("A numeric errcode should classify as provider error.");
		};

		assert_eq!(code, "45011");
		assert_eq!(message, None);
	}

	#[test]
	fn error_code_wins_over_identity() {
		assert!(matches!(
			outcome(r#"{"openid":"o-1","errcode":"-1","errmsg":"system busy"}"#),
			ExchangeOutcome::ProviderError { .. }
		));
	}

	#[test]
	fn blank_error_code_falls_through_to_identity() {
		assert!(matches!(
			outcome(r#"{"openid":"o-1","errcode":"","errmsg":"ok"}"#),
			ExchangeOutcome::Success { .. }
		));
	}

	#[test]
	fn empty_object_is_malformed() {
		assert!(matches!(
			outcome("{}"),
			ExchangeOutcome::TransportError { cause: TransportError::MalformedResponse { .. } }
		));
		assert!(matches!(
			outcome(r#"{"openid":"   "}"#),
			ExchangeOutcome::TransportError { cause: TransportError::MalformedResponse { .. } }
		));
	}

	#[test]
	fn unparseable_bodies_are_transport_errors() {
		assert!(matches!(
			outcome("<html>busy</html>"),
			ExchangeOutcome::TransportError { cause: TransportError::InvalidJson { .. } }
		));
		assert!(matches!(
			outcome(r#"["o-1"]"#),
			ExchangeOutcome::TransportError { cause: TransportError::MalformedResponse { .. } }
		));
	}

	#[test]
	fn structured_field_reports_its_path() {
		let ExchangeOutcome::TransportError { cause: TransportError::MalformedJson { source } } =
			outcome(r#"{"openid":{"nested":true}}"#)
		else {
			panic!("An object-valued openid should be malformed JSON.");
		};

		assert_eq!(source.path().to_string(), "openid");
	}

	#[test]
	fn invalid_identity_values_are_malformed() {
		assert!(matches!(
			outcome(r#"{"openid":"o 1"}"#),
			ExchangeOutcome::TransportError { cause: TransportError::MalformedResponse { .. } }
		));
	}

	#[test]
	fn classification_is_deterministic() {
		let body = br#"{"openid":"o-7","unionid":"u-7"}"#;

		assert_eq!(classify(body).as_str(), classify(body).as_str());
		assert_eq!(classify(body).as_str(), "success");
	}
}
