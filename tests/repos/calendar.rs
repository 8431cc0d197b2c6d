use diesel::prelude::*;

use calendar_api::calendar::{Calendar, NewCalendar};
use calendar_api::schema::calendars;

use crate::common::*;

#[test]
fn insert_calendar() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();

	let created = suite
		.calendar_repo
		.create(
			&mut fixture.conn(),
			NewCalendar {
				name: "household",
				case: 100,
				owner_id: bob.id,
			},
		)
		.unwrap();

	let got = calendars::table
		.find(created.id)
		.first::<Calendar>(&mut fixture.conn())
		.unwrap();
	assert_eq!(got, created);
	assert_eq!(got.case, 100);
}

#[test]
fn insert_calendar_for_missing_owner_fails() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);

	let got_err = suite
		.calendar_repo
		.create(
			&mut fixture.conn(),
			NewCalendar {
				name: "orphan",
				case: 0,
				owner_id: 1,
			},
		)
		.unwrap_err();

	assert_eq!(got_err, db::Error::ForeignKeyViolation)
}

#[test]
fn list_all_and_list_for_owner() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();
	let lucy = fixture.user_factory.lucy();

	let bob_cal = fixture.calendar_factory.calendar(bob.id, "bob's", 0);
	let lucy_cal = fixture.calendar_factory.calendar(lucy.id, "lucy's", 0);

	let all = suite.calendar_repo.list_all(&mut fixture.conn()).unwrap();
	assert_eq!(all, vec![bob_cal.clone(), lucy_cal.clone()]);

	let got = suite.calendar_repo.list_for_owner(&mut fixture.conn(), lucy.id).unwrap();
	assert_eq!(got, vec![lucy_cal]);
}

#[test]
fn rename_calendar() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();
	let calendar = fixture.calendar_factory.calendar(bob.id, "before", 50);

	let got = suite.calendar_repo.rename(&mut fixture.conn(), calendar.id, "after").unwrap();

	assert_eq!(got.name, "after");
	assert_eq!(got.case, 50);
	assert_eq!(got.owner_id, bob.id);
}

#[test]
fn apply_case_in_both_directions() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();
	let calendar = fixture.calendar_factory.calendar(bob.id, "wallet", 100);

	let got = suite.calendar_repo.apply_case(&mut fixture.conn(), calendar.id, -30).unwrap();
	assert_eq!(got.case, 70);

	let got = suite.calendar_repo.apply_case(&mut fixture.conn(), calendar.id, 45).unwrap();
	assert_eq!(got.case, 115);
}

#[test]
fn lock_pair_returns_ascending_and_skips_missing() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();

	let first = fixture.calendar_factory.calendar(bob.id, "first", 0);
	let second = fixture.calendar_factory.calendar(bob.id, "second", 0);

	// Ascending order regardless of the argument order.
	let got = suite
		.calendar_repo
		.lock_pair(&mut fixture.conn(), second.id, first.id)
		.unwrap();
	assert_eq!(got, vec![first.clone(), second.clone()]);

	let got = suite
		.calendar_repo
		.lock_pair(&mut fixture.conn(), first.id, second.id + 1000)
		.unwrap();
	assert_eq!(got, vec![first]);
}

#[test]
fn deleting_the_owner_cascades() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();
	let calendar = fixture.calendar_factory.calendar(bob.id, "doomed", 0);

	suite.user_repo.delete(&mut fixture.conn(), bob.id).unwrap();

	let got_err = suite.calendar_repo.find_by_id(&mut fixture.conn(), calendar.id).unwrap_err();
	assert_eq!(got_err, db::Error::RecordNotFound)
}
