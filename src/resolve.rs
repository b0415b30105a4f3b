//! Find-or-create binding of an external identity to a directory user.
//!
//! [`IdentityResolver::resolve_or_create`] looks the user up by the application's open-id
//! attribute and creates one only when none exists. Two layers keep the lookup-then-create
//! sequence from producing duplicates:
//!
//! - a per-`(realm, attribute, openid)` guard serializes concurrent attempts inside this
//!   process, so late arrivals find the user the first attempt created;
//! - [`UserDirectory::create_user`] is a compare-and-create, so a writer racing from another
//!   process gets [`CreateOutcome::Conflict`] and the resolver falls back to a lookup.

// self
use crate::{
	_prelude::*,
	auth::{AppId, ExternalIdentityKey, OpenId, RealmId, UnionId},
	directory::{CreateOutcome, DirectoryError, NewUser, UserDirectory, UserIdentity},
	obs::{self, FlowStage},
};

const MAX_CREATE_ATTEMPTS: usize = 3;

type GuardMap = Mutex<HashMap<GuardKey, Arc<AsyncMutex<()>>>>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GuardKey {
	realm: RealmId,
	attribute: String,
	open_id: OpenId,
}

/// Maps external identities to directory users.
#[derive(Clone)]
pub struct IdentityResolver {
	directory: Arc<dyn UserDirectory>,
	guards: Arc<GuardMap>,
}
impl IdentityResolver {
	/// Creates a resolver on top of the host's user directory.
	pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
		Self { directory, guards: Default::default() }
	}

	/// Directory the resolver reads from and writes to.
	pub fn directory(&self) -> &Arc<dyn UserDirectory> {
		&self.directory
	}

	/// Returns the user bound to `open_id` for `app_id`, creating it when absent.
	///
	/// An existing user is returned untouched, even when `union_id` differs from the stored
	/// value. A new user gets `username = open_id`, is enabled, and carries both namespace
	/// attributes; the union-id attribute is set without a value when `union_id` is `None`.
	pub async fn resolve_or_create(
		&self,
		realm: &RealmId,
		app_id: &AppId,
		open_id: &OpenId,
		union_id: Option<&UnionId>,
	) -> Result<UserIdentity> {
		let key = ExternalIdentityKey::for_app(app_id);
		let lease = GuardLease::acquire(
			&self.guards,
			GuardKey {
				realm: realm.clone(),
				attribute: key.open_id_attribute.clone(),
				open_id: open_id.clone(),
			},
		);
		let _singleflight = lease.lock().await;

		self.find_or_create(realm, &key, open_id, union_id).await
	}

	async fn find_or_create(
		&self,
		realm: &RealmId,
		key: &ExternalIdentityKey,
		open_id: &OpenId,
		union_id: Option<&UnionId>,
	) -> Result<UserIdentity> {
		for attempt in 1..=MAX_CREATE_ATTEMPTS {
			if let Some(existing) =
				self.directory.find_by_attribute(realm, &key.open_id_attribute, open_id).await?
			{
				obs::note(
					FlowStage::Resolved,
					format_args!("User {} is already bound to openid {open_id}.", existing.id),
				);

				return Ok(existing);
			}

			let new_user = NewUser::new(open_id.to_string())
				.with_enabled(true)
				.with_attribute(key.open_id_attribute.clone(), Some(open_id.to_string()))
				.with_attribute(key.union_id_attribute.clone(), union_id.map(UnionId::to_string))
				.unique_on(key.open_id_attribute.clone());

			match self.directory.create_user(realm, new_user).await? {
				CreateOutcome::Created(user) => {
					obs::note(
						FlowStage::Resolved,
						format_args!("Created user {} for openid {open_id}.", user.id),
					);

					return Ok(user);
				},
				CreateOutcome::Conflict(conflict) => obs::note(
					FlowStage::Resolved,
					format_args!(
						"Creation attempt {attempt} for openid {open_id} conflicted ({conflict:?}); looking up again."
					),
				),
			}
		}

		Err(DirectoryError::UnresolvedConflict {
			message: format!(
				"creating a user for {} = {open_id} conflicted {MAX_CREATE_ATTEMPTS} times without a bound user appearing",
				key.open_id_attribute
			),
		}
		.into())
	}
}
impl Debug for IdentityResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityResolver").field("active_guards", &self.guards.lock().len()).finish()
	}
}

/// Holds a per-key guard and drops the map entry once no other attempt references it.
struct GuardLease<'a> {
	guards: &'a GuardMap,
	key: GuardKey,
	lock: Arc<AsyncMutex<()>>,
}
impl<'a> GuardLease<'a> {
	fn acquire(guards: &'a GuardMap, key: GuardKey) -> Self {
		let lock = guards
			.lock()
			.entry(key.clone())
			.or_insert_with(|| Arc::new(AsyncMutex::new(())))
			.clone();

		Self { guards, key, lock }
	}

	async fn lock(&self) -> async_lock::MutexGuard<'_, ()> {
		self.lock.lock().await
	}
}
impl Drop for GuardLease<'_> {
	fn drop(&mut self) {
		let mut guards = self.guards.lock();

		// Clones are only taken under the map lock; the map and this lease are the last holders.
		if Arc::strong_count(&self.lock) == 2 {
			guards.remove(&self.key);
		}
	}
}
