//! Attribute namespace that binds one mini-program application to directory users.

// self
use crate::{_prelude::*, auth::AppId};

const ATTRIBUTE_PREFIX: &str = "wmp_";
const OPEN_ID_SUFFIX: &str = "_openid";
const UNION_ID_SUFFIX: &str = "_unionid";

/// Pair of user attribute names derived from an [`AppId`].
///
/// The fixed prefix and suffixes make the mapping injective: two distinct app ids never share
/// an attribute name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalIdentityKey {
	/// Attribute holding the application-scoped `openid` (`wmp_<appId>_openid`).
	pub open_id_attribute: String,
	/// Attribute holding the optional `unionid` (`wmp_<appId>_unionid`).
	pub union_id_attribute: String,
}
impl ExternalIdentityKey {
	/// Derives the attribute names for the provided application.
	pub fn for_app(app_id: &AppId) -> Self {
		Self {
			open_id_attribute: format!("{ATTRIBUTE_PREFIX}{app_id}{OPEN_ID_SUFFIX}"),
			union_id_attribute: format!("{ATTRIBUTE_PREFIX}{app_id}{UNION_ID_SUFFIX}"),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn app(value: &str) -> AppId {
		AppId::new(value).expect("App fixture should be valid.")
	}

	#[test]
	fn attribute_names_follow_namespace() {
		let key = ExternalIdentityKey::for_app(&app("wx1"));

		assert_eq!(key.open_id_attribute, "wmp_wx1_openid");
		assert_eq!(key.union_id_attribute, "wmp_wx1_unionid");
		assert_eq!(key, ExternalIdentityKey::for_app(&app("wx1")));
	}

	#[test]
	fn distinct_apps_never_collide() {
		let apps = ["wx1", "wx11", "wx1_openid", "1", "wx", "wx1_unionid", "openid"];
		let mut seen = HashMap::new();

		for id in apps {
			let key = ExternalIdentityKey::for_app(&app(id));

			for name in [&key.open_id_attribute, &key.union_id_attribute] {
				if let Some(previous) = seen.insert(name.clone(), id) {
					panic!("Attribute {name} is shared by {previous} and {id}.");
				}
			}
		}
	}
}
