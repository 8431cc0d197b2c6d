use diesel::prelude::*;

use crate::db;
use crate::schema::calendars;
use crate::types::Id;
use crate::user::User;

/// A named account holding an integer `case` balance, owned by one user.
#[derive(Queryable, Identifiable, Associations, PartialEq, Debug, Clone)]
#[diesel(belongs_to(User, foreign_key = owner_id))]
#[diesel(table_name = calendars)]
pub struct Calendar {
	pub id: Id,
	pub name: String,
	pub case: i64,
	pub owner_id: Id,
}

#[derive(Insertable)]
#[diesel(table_name = calendars)]
pub struct NewCalendar<'a> {
	pub name: &'a str,
	pub case: i64,
	pub owner_id: Id,
}

#[derive(Clone, Copy, Default)]
pub struct Repo;

impl Repo {
	pub fn new() -> Self {
		Repo
	}

	pub fn create(&self, conn: &mut PgConnection, new_calendar: NewCalendar) -> db::Result<Calendar> {
		diesel::insert_into(calendars::table)
			.values(&new_calendar)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find_by_id(&self, conn: &mut PgConnection, id: Id) -> db::Result<Calendar> {
		calendars::table
			.find(id)
			.first::<Calendar>(conn)
			.map_err(Into::into)
	}

	pub fn list_all(&self, conn: &mut PgConnection) -> db::Result<Vec<Calendar>> {
		calendars::table
			.order(calendars::id.asc())
			.load::<Calendar>(conn)
			.map_err(Into::into)
	}

	pub fn list_for_owner(&self, conn: &mut PgConnection, owner_id: Id) -> db::Result<Vec<Calendar>> {
		calendars::table
			.filter(calendars::owner_id.eq(owner_id))
			.order(calendars::id.asc())
			.load::<Calendar>(conn)
			.map_err(Into::into)
	}

	pub fn rename(&self, conn: &mut PgConnection, id: Id, name: &str) -> db::Result<Calendar> {
		diesel::update(calendars::table.find(id))
			.set(calendars::name.eq(name))
			.get_result(conn)
			.map_err(Into::into)
	}

	/// Deletes zero or one row; a missing id is not an error.
	pub fn delete(&self, conn: &mut PgConnection, id: Id) -> db::Result<usize> {
		diesel::delete(calendars::table.find(id))
			.execute(conn)
			.map_err(Into::into)
	}

	/// Adds `delta` (which may be negative) to the calendar's case.
	pub fn apply_case(&self, conn: &mut PgConnection, id: Id, delta: i64) -> db::Result<Calendar> {
		diesel::update(calendars::table.find(id))
			.set(calendars::case.eq(calendars::case + delta))
			.get_result(conn)
			.map_err(Into::into)
	}

	/// Locks the two calendars `FOR UPDATE`, always in ascending-id order so
	/// that concurrent transfers over the same pair cannot deadlock. Rows that
	/// don't exist are simply absent from the result.
	pub fn lock_pair(&self, conn: &mut PgConnection, a: Id, b: Id) -> db::Result<Vec<Calendar>> {
		calendars::table
			.filter(calendars::id.eq_any(vec![a, b]))
			.order(calendars::id.asc())
			.for_update()
			.load::<Calendar>(conn)
			.map_err(Into::into)
	}
}
