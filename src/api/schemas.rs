//! Wire types and the explicit input validation that replaces the original
//! declarative schema layer. Field names match the deployed JSON contract.

use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::error::{Error, Kind};
use crate::event::Event;
use crate::types::{Id, Time};
use crate::user::{User, UserFilter};
use crate::Result;

#[derive(Debug, Deserialize)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
	pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UserToCreate {
	pub email: String,
	pub password: String,
	pub first_name: String,
	pub last_name: String,
}

impl UserToCreate {
	pub fn validate(&self) -> Result<()> {
		valid_email(&self.email)?;
		required("password", &self.password)?;
		required("first_name", &self.first_name)?;
		required("last_name", &self.last_name)
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct UserToUpdate {
	pub email: Option<String>,
	pub password: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
}

impl UserToUpdate {
	pub fn validate(&self) -> Result<()> {
		if let Some(email) = &self.email {
			valid_email(email)?;
		}
		if let Some(password) = &self.password {
			required("password", password)?;
		}
		if let Some(first_name) = &self.first_name {
			required("first_name", first_name)?;
		}
		if let Some(last_name) = &self.last_name {
			required("last_name", last_name)?;
		}
		Ok(())
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
	pub email: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
}

impl From<ListUsersQuery> for UserFilter {
	fn from(q: ListUsersQuery) -> UserFilter {
		UserFilter {
			email: q.email,
			first_name: q.first_name,
			last_name: q.last_name,
		}
	}
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserData {
	pub uid: Id,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
}

impl From<User> for UserData {
	fn from(user: User) -> UserData {
		UserData {
			uid: user.id,
			email: user.email,
			first_name: user.first_name,
			last_name: user.last_name,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct CalendarToCreate {
	pub name: String,
	/// Only honoured when the caller is admin; everyone else owns what
	/// they create.
	pub owner_uid: Option<Id>,
}

impl CalendarToCreate {
	pub fn validate(&self) -> Result<()> {
		required("name", &self.name)
	}
}

#[derive(Debug, Deserialize)]
pub struct CalendarToUpdate {
	pub name: String,
}

impl CalendarToUpdate {
	pub fn validate(&self) -> Result<()> {
		required("name", &self.name)
	}
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CalendarData {
	pub uid: Id,
	pub name: String,
	pub case: i64,
	pub owner_uid: Id,
}

impl From<Calendar> for CalendarData {
	fn from(calendar: Calendar) -> CalendarData {
		CalendarData {
			uid: calendar.id,
			name: calendar.name,
			case: calendar.case,
			owner_uid: calendar.owner_id,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct CaseToSend {
	pub to_calendar: Id,
	pub case: i64,
}

impl CaseToSend {
	pub fn validate(&self) -> Result<()> {
		if self.case < 0 {
			return Err(Error::new(Kind::Validation(
				"case must be a non-negative integer".to_string(),
			)));
		}
		Ok(())
	}
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EventData {
	pub uid: Id,
	pub from_calendar: Id,
	pub to_calendar: Id,
	pub case: i64,
	pub datetime: Time,
}

impl From<Event> for EventData {
	fn from(event: Event) -> EventData {
		EventData {
			uid: event.id,
			from_calendar: event.from_calendar_id,
			to_calendar: event.to_calendar_id,
			case: event.case,
			datetime: event.created_at,
		}
	}
}

fn required(field: &str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(Error::new(Kind::Validation(format!(
			"{} must not be empty",
			field
		))));
	}
	Ok(())
}

/// `local@domain` with a dotted, non-empty domain; enough to reject the
/// obviously malformed without trying to out-lawyer RFC 5321.
pub fn valid_email(email: &str) -> Result<()> {
	let invalid = || Error::new(Kind::Validation(format!("{:?} is not a valid email", email)));

	let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
	if local.is_empty() || domain.is_empty() {
		return Err(invalid());
	}
	if email.chars().any(char::is_whitespace) || domain.contains('@') {
		return Err(invalid());
	}
	let mut labels = domain.split('.');
	if !labels.all(|label| !label.is_empty()) || !domain.contains('.') {
		return Err(invalid());
	}

	Ok(())
}
