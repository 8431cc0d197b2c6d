use diesel::prelude::*;

use crate::db;
use crate::schema::events;
use crate::types::{Id, Time};

/// Audit record of a case transfer between two calendars.
///
/// Rows are written once, by the transfer operation, and never mutated;
/// `created_at` is assigned by the database.
#[derive(Queryable, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = events)]
pub struct Event {
	pub id: Id,
	pub from_calendar_id: Id,
	pub to_calendar_id: Id,
	pub case: i64,
	pub created_at: Time,
}

#[derive(Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
	pub from_calendar_id: Id,
	pub to_calendar_id: Id,
	pub case: i64,
}

#[derive(Clone, Copy, Default)]
pub struct Repo;

impl Repo {
	pub fn new() -> Self {
		Repo
	}

	pub fn create(&self, conn: &mut PgConnection, new_event: NewEvent) -> db::Result<Event> {
		diesel::insert_into(events::table)
			.values(&new_event)
			.get_result::<Event>(conn)
			.map_err(Into::into)
	}

	/// Every event where the calendar is source or destination, oldest first.
	/// The id is the tiebreak for events created in the same instant.
	pub fn list_for_calendar(&self, conn: &mut PgConnection, calendar_id: Id) -> db::Result<Vec<Event>> {
		events::table
			.filter(events::from_calendar_id.eq(calendar_id))
			.or_filter(events::to_calendar_id.eq(calendar_id))
			.order((events::created_at.asc(), events::id.asc()))
			.load::<Event>(conn)
			.map_err(Into::into)
	}
}
