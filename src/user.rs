use diesel::prelude::*;

use crate::db;
use crate::schema::users;
use crate::types::Id;

#[derive(Queryable, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = users)]
pub struct User {
	pub id: Id,
	pub email: String,
	/// Opaque bcrypt digest; never serialized back to callers
	pub password_hash: String,
	pub first_name: String,
	pub last_name: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
	pub email: &'a str,
	pub password_hash: &'a str,
	pub first_name: &'a str,
	pub last_name: &'a str,
}

/// Partial update; `None` fields are left untouched.
#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = users)]
pub struct UserUpdate {
	pub email: Option<String>,
	pub password_hash: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
}

impl UserUpdate {
	pub fn is_empty(&self) -> bool {
		self.email.is_none()
			&& self.password_hash.is_none()
			&& self.first_name.is_none()
			&& self.last_name.is_none()
	}
}

pub enum UserKey<'a> {
	Id(Id),
	Email(&'a str),
}

/// Equality/substring filters for listing users; absent filters are no-ops.
/// Values are matched with SQL `LIKE`, so callers may carry `%` wildcards.
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
	pub email: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
}

#[derive(Clone, Copy, Default)]
pub struct Repo;

impl Repo {
	pub fn new() -> Self {
		Repo
	}

	pub fn create(&self, conn: &mut PgConnection, new_user: NewUser) -> db::Result<User> {
		diesel::insert_into(users::table)
			.values(&new_user)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find(&self, conn: &mut PgConnection, key: UserKey) -> db::Result<User> {
		match key {
			UserKey::Id(id) => users::table
				.find(id)
				.first::<User>(conn)
				.map_err(Into::into),
			UserKey::Email(email) => users::table
				.filter(users::email.eq(email))
				.first::<User>(conn)
				.map_err(Into::into),
		}
	}

	pub fn list(&self, conn: &mut PgConnection, filter: &UserFilter) -> db::Result<Vec<User>> {
		let mut query = users::table.into_boxed();
		if let Some(email) = &filter.email {
			query = query.filter(users::email.like(email.clone()));
		}
		if let Some(first_name) = &filter.first_name {
			query = query.filter(users::first_name.like(first_name.clone()));
		}
		if let Some(last_name) = &filter.last_name {
			query = query.filter(users::last_name.like(last_name.clone()));
		}

		query
			.order(users::id.asc())
			.load::<User>(conn)
			.map_err(Into::into)
	}

	pub fn update(&self, conn: &mut PgConnection, id: Id, changes: UserUpdate) -> db::Result<User> {
		diesel::update(users::table.find(id))
			.set(&changes)
			.get_result(conn)
			.map_err(Into::into)
	}

	/// Deletes zero or one row; a missing id is not an error.
	pub fn delete(&self, conn: &mut PgConnection, id: Id) -> db::Result<usize> {
		diesel::delete(users::table.find(id))
			.execute(conn)
			.map_err(Into::into)
	}
}
