use diesel::Connection;
use log::warn;

use crate::auth::Identity;
use crate::calendar::{self, Calendar};
use crate::db::{self, PgPool};
use crate::error::{Error, Kind};
use crate::event::{self, Event, NewEvent};
use crate::types::Id;
use crate::Result;

/// Attempts per transfer before a serialization conflict is given up on.
const CONFLICT_ATTEMPTS: u32 = 3;

/// Service for moving case between calendars.
#[derive(Clone)]
pub struct Service {
	db: PgPool,
	calendar_repo: calendar::Repo,
	event_repo: event::Repo,
	allow_overdraft: bool,
}

/// Parameter object for creating a new Service
pub struct NewService {
	pub db: PgPool,
	pub calendar_repo: calendar::Repo,
	pub event_repo: event::Repo,
	pub allow_overdraft: bool,
}

impl Service {
	pub fn new(n: NewService) -> Self {
		Service {
			db: n.db,
			calendar_repo: n.calendar_repo,
			event_repo: n.event_repo,
			allow_overdraft: n.allow_overdraft,
		}
	}

	/// Transfer case from calendar to calendar and record the audit event.
	///
	/// The debit, the credit, and the event insert commit together or not at
	/// all. The requesting identity must own the source calendar (admin may
	/// act on any); the destination only has to exist. A serialization
	/// conflict from the store is retried a bounded number of times.
	///
	/// # Arguments
	/// * `from_id` - source calendar, debited
	/// * `to_id` - destination calendar, credited
	/// * `case` - non-negative quantity to move
	/// * `identity` - the principal requesting the transfer
	pub fn send_case(&self, from_id: Id, to_id: Id, case: i64, identity: &Identity) -> Result<Event> {
		let mut attempt = 1;
		loop {
			match self.send_case_once(from_id, to_id, case, identity) {
				Err(e)
					if matches!(e.kind(), Kind::Database(db::Error::Conflict))
						&& attempt < CONFLICT_ATTEMPTS =>
				{
					warn!(
						target: "calendar::ledger",
						"transfer {} -> {} conflicted, retrying (attempt {})",
						from_id, to_id, attempt,
					);
					attempt += 1;
				}
				other => return other,
			}
		}
	}

	fn send_case_once(&self, from_id: Id, to_id: Id, case: i64, identity: &Identity) -> Result<Event> {
		let conn = &mut self.db.get()?;

		conn.transaction::<Event, Error, _>(|conn| {
			let rows = self.calendar_repo.lock_pair(conn, from_id, to_id)?;
			let from = pick(&rows, from_id)?;
			pick(&rows, to_id)?;

			if !identity.owns_calendar(from) {
				return Err(Error::new(Kind::Forbidden));
			}
			if !self.allow_overdraft && from.case < case {
				return Err(Error::new(Kind::InsufficientCase));
			}

			self.calendar_repo.apply_case(conn, from_id, -case)?;
			self.calendar_repo.apply_case(conn, to_id, case)?;

			let event = self.event_repo.create(
				conn,
				NewEvent {
					from_calendar_id: from_id,
					to_calendar_id: to_id,
					case,
				},
			)?;

			Ok(event)
		})
	}
}

fn pick(rows: &[Calendar], id: Id) -> Result<&Calendar> {
	rows.iter()
		.find(|c| c.id == id)
		.ok_or_else(|| Error::new(Kind::Database(db::Error::RecordNotFound)))
}
