//! Thread-safe in-memory [`UserDirectory`] implementation for local development and tests.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{RealmId, UserId},
	directory::{
		CreateConflict, CreateOutcome, DirectoryError, DirectoryFuture, NewUser, UserDirectory,
		UserIdentity,
	},
};

const USER_ID_LEN: usize = 24;

type RealmMap = Arc<RwLock<HashMap<RealmId, BTreeMap<UserId, UserIdentity>>>>;

/// Thread-safe directory backend that keeps users in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryDirectory(RealmMap);
impl MemoryDirectory {
	/// Returns a snapshot of every user in `realm`, ordered by identifier.
	pub fn users(&self, realm: &RealmId) -> Vec<UserIdentity> {
		self.0.read().get(realm).map(|users| users.values().cloned().collect()).unwrap_or_default()
	}

	/// Number of users stored in `realm`.
	pub fn user_count(&self, realm: &RealmId) -> usize {
		self.0.read().get(realm).map_or(0, BTreeMap::len)
	}

	/// Inserts a fully formed record, bypassing uniqueness checks.
	///
	/// Intended for seeding fixtures that model pre-existing accounts.
	pub fn insert(&self, user: UserIdentity) {
		self.0.write().entry(user.realm.clone()).or_default().insert(user.id.clone(), user);
	}

	fn find_now(
		map: &RealmMap,
		realm: &RealmId,
		name: &str,
		value: &str,
	) -> Option<UserIdentity> {
		let guard = map.read();

		guard.get(realm)?.values().find(|user| user.attribute(name) == Some(value)).cloned()
	}

	fn create_now(
		map: &RealmMap,
		realm: &RealmId,
		user: NewUser,
	) -> Result<CreateOutcome, DirectoryError> {
		let mut guard = map.write();
		let users = guard.entry(realm.clone()).or_default();

		let taken = user.unique_value().filter(|(name, value)| {
			users.values().any(|existing| existing.attribute(name) == Some(*value))
		});

		if let Some((name, _)) = taken {
			let conflict = CreateConflict::Attribute { name: name.to_owned() };

			return Ok(CreateOutcome::Conflict(conflict));
		}
		if users.values().any(|existing| existing.username == user.username) {
			return Ok(CreateOutcome::Conflict(CreateConflict::Username));
		}

		let id = Self::fresh_id(users)?;
		let record = UserIdentity {
			id: id.clone(),
			realm: realm.clone(),
			username: user.username,
			enabled: user.enabled,
			created_at: OffsetDateTime::now_utc(),
			attributes: user.attributes,
		};

		users.insert(id, record.clone());

		Ok(CreateOutcome::Created(record))
	}

	fn fresh_id(users: &BTreeMap<UserId, UserIdentity>) -> Result<UserId, DirectoryError> {
		loop {
			let candidate: String =
				rand::rng().sample_iter(Alphanumeric).take(USER_ID_LEN).map(char::from).collect();
			let id = UserId::new(candidate)
				.map_err(|e| DirectoryError::Backend { message: e.to_string() })?;

			if !users.contains_key(&id) {
				return Ok(id);
			}
		}
	}

	fn get_now(map: &RealmMap, realm: &RealmId, id: &UserId) -> Option<UserIdentity> {
		map.read().get(realm)?.get(id).cloned()
	}
}
impl UserDirectory for MemoryDirectory {
	fn find_by_attribute<'a>(
		&'a self,
		realm: &'a RealmId,
		name: &'a str,
		value: &'a str,
	) -> DirectoryFuture<'a, Option<UserIdentity>> {
		Box::pin(async move { Ok(Self::find_now(&self.0, realm, name, value)) })
	}

	fn create_user<'a>(
		&'a self,
		realm: &'a RealmId,
		user: NewUser,
	) -> DirectoryFuture<'a, CreateOutcome> {
		Box::pin(async move { Self::create_now(&self.0, realm, user) })
	}

	fn get<'a>(
		&'a self,
		realm: &'a RealmId,
		id: &'a UserId,
	) -> DirectoryFuture<'a, Option<UserIdentity>> {
		Box::pin(async move { Ok(Self::get_now(&self.0, realm, id)) })
	}
}
