use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock};

use diesel::prelude::*;

pub use calendar_api::*;

use calendar_api::calendar::{Calendar, NewCalendar};
use calendar_api::config::{Config, DEFAULT_ADMIN_USERNAME};
use calendar_api::db::{PgPool, PooledPg};
use calendar_api::schema::{calendars, users};
use calendar_api::types::Id;
use calendar_api::user::{NewUser, User};

pub const ADMIN_SECRET: &str = "super-secret";
pub const USER_PASSWORD: &str = "password";

/// Low bcrypt cost keeps the test runs fast.
const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config() -> Config {
	dotenv::dotenv().ok();
	Config {
		database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests"),
		listen_addr: "127.0.0.1:3030".parse().unwrap(),
		admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
		admin_secret: ADMIN_SECRET.to_string(),
		token_secret: "test-token-secret".to_string(),
		token_ttl_secs: 3_600,
		allow_overdraft: true,
	}
}

static DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct Fixture {
	pub pool: PgPool,
	pub config: Config,
	pub user_factory: UserFactory,
	pub calendar_factory: CalendarFactory,
	// Tests share one database; holding this serializes them.
	_db: MutexGuard<'static, ()>,
}

impl Fixture {
	pub fn new() -> Self {
		let _db = DB_LOCK
			.get_or_init(|| Mutex::new(()))
			.lock()
			.unwrap_or_else(|e| e.into_inner());

		let config = test_config();
		let pool = db::pg_pool(&config.database_url).expect("connecting to test database");
		let user_factory = UserFactory::new(pool.clone());
		let calendar_factory = CalendarFactory::new(pool.clone());
		Fixture {
			pool,
			config,
			user_factory,
			calendar_factory,
			_db,
		}
	}

	pub fn pool(&self) -> PgPool {
		self.pool.clone()
	}

	pub fn conn(&self) -> PooledPg {
		self.pool.get().unwrap()
	}

	pub fn teardown(&self) {
		// Children first, the rest cascades anyway.
		for table in ["events", "calendars", "users"] {
			diesel::sql_query(format!("DELETE FROM {}", table))
				.execute(&mut self.conn())
				.expect("deleting db table");
		}
	}
}

pub struct Suite {
	pub user_repo: user::Repo,
	pub calendar_repo: calendar::Repo,
	pub event_repo: event::Repo,
}

impl Suite {
	pub fn setup(fixture: &Fixture) -> Self {
		fixture.teardown();

		Suite {
			user_repo: user::Repo::new(),
			calendar_repo: calendar::Repo::new(),
			event_repo: event::Repo::new(),
		}
	}
}

pub fn ledger_service(fixture: &Fixture, allow_overdraft: bool) -> ledger::Service {
	ledger::Service::new(ledger::NewService {
		db: fixture.pool(),
		calendar_repo: calendar::Repo::new(),
		event_repo: event::Repo::new(),
		allow_overdraft,
	})
}

#[test]
fn test_suite_setup() {
	let fixture = Fixture::new();
	let _suite = Suite::setup(&fixture);
}

pub struct UserFactory {
	pool: PgPool,
}

impl UserFactory {
	fn new(pool: PgPool) -> Self {
		UserFactory { pool }
	}

	pub fn user(&self, email: &str, first_name: &str, last_name: &str) -> User {
		let password_hash = bcrypt::hash(USER_PASSWORD, TEST_BCRYPT_COST).unwrap();
		diesel::insert_into(users::table)
			.values(NewUser {
				email,
				password_hash: &password_hash,
				first_name,
				last_name,
			})
			.get_result(&mut self.pool.get().unwrap())
			.unwrap()
	}

	pub fn bob(&self) -> User {
		self.user("bob@gmail.com", "Bob", "Roberts")
	}

	pub fn lucy(&self) -> User {
		self.user("lucy@gmail.com", "Lucy", "Luke")
	}
}

pub struct CalendarFactory {
	pool: PgPool,
}

impl CalendarFactory {
	fn new(pool: PgPool) -> Self {
		CalendarFactory { pool }
	}

	pub fn calendar(&self, owner_id: Id, name: &str, case: i64) -> Calendar {
		diesel::insert_into(calendars::table)
			.values(NewCalendar { name, case, owner_id })
			.get_result(&mut self.pool.get().unwrap())
			.unwrap()
	}
}
