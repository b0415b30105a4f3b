//! User directory contract and the built-in in-memory directory.
//!
//! The host identity platform owns user persistence. The authenticator only needs three
//! operations: look a user up by an attribute value, fetch a user by id, and a
//! compare-and-create that refuses to create a second user holding the same unique
//! attribute value.

pub mod memory;
pub mod user;

pub use memory::MemoryDirectory;
pub use user::*;

// self
use crate::{
	_prelude::*,
	auth::{RealmId, UserId},
};

/// Boxed future returned by [`UserDirectory`] operations.
pub type DirectoryFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, DirectoryError>> + 'a + Send>>;

/// Directory backend contract implemented by host user stores.
pub trait UserDirectory
where
	Self: Send + Sync,
{
	/// Returns the first user in `realm` whose attribute `name` equals `value`.
	fn find_by_attribute<'a>(
		&'a self,
		realm: &'a RealmId,
		name: &'a str,
		value: &'a str,
	) -> DirectoryFuture<'a, Option<UserIdentity>>;

	/// Creates a user unless its username or unique attribute value is already taken.
	///
	/// The check and the insert must be atomic with respect to other `create_user` calls
	/// on the same realm.
	fn create_user<'a>(
		&'a self,
		realm: &'a RealmId,
		user: NewUser,
	) -> DirectoryFuture<'a, CreateOutcome>;

	/// Fetches a user by identifier.
	fn get<'a>(
		&'a self,
		realm: &'a RealmId,
		id: &'a UserId,
	) -> DirectoryFuture<'a, Option<UserIdentity>>;
}

/// Result of a compare-and-create attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateOutcome {
	/// No conflicting user existed; the new record was stored.
	Created(UserIdentity),
	/// Another user already holds the username or the unique attribute value.
	Conflict(CreateConflict),
}

/// Which uniqueness rule rejected a [`UserDirectory::create_user`] call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateConflict {
	/// The unique attribute value is held by another user.
	Attribute {
		/// Attribute name that collided.
		name: String,
	},
	/// The username is held by another user.
	Username,
}

/// Error type produced by [`UserDirectory`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum DirectoryError {
	/// Backend-level failure for the user store.
	#[error("Directory backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Creation kept conflicting without a matching user becoming visible.
	#[error("Directory conflict could not be resolved: {message}.")]
	UnresolvedConflict {
		/// Human-readable error payload.
		message: String,
	},
}
