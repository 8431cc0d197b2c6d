use calendar_api::event::NewEvent;

use crate::common::*;

#[test]
fn insert_event_gets_a_timestamp() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();
	let from = fixture.calendar_factory.calendar(bob.id, "from", 100);
	let to = fixture.calendar_factory.calendar(bob.id, "to", 0);

	let event = suite
		.event_repo
		.create(
			&mut fixture.conn(),
			NewEvent {
				from_calendar_id: from.id,
				to_calendar_id: to.id,
				case: 25,
			},
		)
		.unwrap();

	assert_eq!(event.from_calendar_id, from.id);
	assert_eq!(event.to_calendar_id, to.id);
	assert_eq!(event.case, 25);
	assert!(event.created_at <= chrono::Utc::now());
}

#[test]
fn list_for_calendar_unions_both_directions_oldest_first() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();
	let lucy = fixture.user_factory.lucy();
	let bob_cal = fixture.calendar_factory.calendar(bob.id, "bob's", 100);
	let lucy_cal = fixture.calendar_factory.calendar(lucy.id, "lucy's", 100);
	let other = fixture.calendar_factory.calendar(lucy.id, "unrelated", 0);

	let conn = &mut fixture.conn();
	let outgoing = suite
		.event_repo
		.create(conn, NewEvent { from_calendar_id: bob_cal.id, to_calendar_id: lucy_cal.id, case: 10 })
		.unwrap();
	let incoming = suite
		.event_repo
		.create(conn, NewEvent { from_calendar_id: lucy_cal.id, to_calendar_id: bob_cal.id, case: 5 })
		.unwrap();
	let unrelated = suite
		.event_repo
		.create(conn, NewEvent { from_calendar_id: lucy_cal.id, to_calendar_id: other.id, case: 1 })
		.unwrap();

	let got = suite.event_repo.list_for_calendar(conn, bob_cal.id).unwrap();
	assert_eq!(got, vec![outgoing.clone(), incoming.clone()]);

	let got = suite.event_repo.list_for_calendar(conn, lucy_cal.id).unwrap();
	assert_eq!(got, vec![outgoing, incoming, unrelated]);
}

#[test]
fn event_for_missing_calendar_fails() {
	let fixture = Fixture::new();
	let suite = Suite::setup(&fixture);
	let bob = fixture.user_factory.bob();
	let from = fixture.calendar_factory.calendar(bob.id, "from", 100);

	let got_err = suite
		.event_repo
		.create(
			&mut fixture.conn(),
			NewEvent {
				from_calendar_id: from.id,
				to_calendar_id: from.id + 1000,
				case: 25,
			},
		)
		.unwrap_err();

	assert_eq!(got_err, db::Error::ForeignKeyViolation)
}
