//! User records as seen by the authenticator.

// self
use crate::{
	_prelude::*,
	auth::{RealmId, UserId},
};

/// Single-valued attribute map; `None` marks an attribute that is set without a value.
pub type Attributes = BTreeMap<String, Option<String>>;

/// User record owned by the host directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
	/// Directory-assigned identifier.
	pub id: UserId,
	/// Realm the user belongs to.
	pub realm: RealmId,
	/// Login name.
	pub username: String,
	/// Whether the account may sign in.
	pub enabled: bool,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// User attributes.
	pub attributes: Attributes,
}
impl UserIdentity {
	/// Returns the attribute value, if the attribute is set and carries one.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).and_then(Option::as_deref)
	}

	/// Returns true when the attribute is set, with or without a value.
	pub fn has_attribute(&self, name: &str) -> bool {
		self.attributes.contains_key(name)
	}
}

/// Creation request passed to [`UserDirectory::create_user`](crate::directory::UserDirectory::create_user).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
	/// Login name.
	pub username: String,
	/// Whether the account may sign in.
	pub enabled: bool,
	/// Attributes stored at creation time.
	pub attributes: Attributes,
	/// Attribute whose value must not be held by any other user of the realm.
	pub unique_attribute: Option<String>,
}
impl NewUser {
	/// Starts a creation request for an enabled user.
	pub fn new(username: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			enabled: true,
			attributes: Attributes::new(),
			unique_attribute: None,
		}
	}

	/// Overrides the enabled flag.
	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;

		self
	}

	/// Sets an attribute; `None` still records the attribute name.
	pub fn with_attribute(mut self, name: impl Into<String>, value: Option<String>) -> Self {
		self.attributes.insert(name.into(), value);

		self
	}

	/// Declares which attribute value must stay unique within the realm.
	pub fn unique_on(mut self, name: impl Into<String>) -> Self {
		self.unique_attribute = Some(name.into());

		self
	}

	/// Value of the unique attribute, if both the declaration and the value are present.
	pub fn unique_value(&self) -> Option<(&str, &str)> {
		let name = self.unique_attribute.as_deref()?;
		let value = self.attributes.get(name)?.as_deref()?;

		Some((name, value))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn absent_attribute_values_are_still_recorded() {
		let user = NewUser::new("o-1")
			.with_attribute("wmp_wx1_openid", Some("o-1".into()))
			.with_attribute("wmp_wx1_unionid", None)
			.unique_on("wmp_wx1_openid");

		assert!(user.enabled);
		assert_eq!(user.unique_value(), Some(("wmp_wx1_openid", "o-1")));
		assert_eq!(user.attributes.get("wmp_wx1_unionid"), Some(&None));
	}

	#[test]
	fn unique_value_requires_declared_attribute() {
		let user = NewUser::new("o-1").with_attribute("wmp_wx1_unionid", None);

		assert_eq!(user.unique_value(), None);
		assert_eq!(user.unique_on("wmp_wx1_unionid").unique_value(), None);
	}
}
