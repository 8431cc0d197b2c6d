use std::fmt;

use diesel::r2d2::ConnectionManager;
use diesel::result::DatabaseErrorKind::{ForeignKeyViolation, SerializationFailure, UniqueViolation};
use diesel::result::Error::{DatabaseError, NotFound};
use diesel::PgConnection;

pub type Result<T> = std::result::Result<T, Error>;
pub type PgPool = diesel::r2d2::Pool<ConnectionManager<PgConnection>>;
pub type PooledPg = diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Build a pooled connection to the underlying PostgreSQL database
pub fn pg_pool(database_url: &str) -> Result<PgPool> {
	let manager = ConnectionManager::<PgConnection>::new(database_url);
	diesel::r2d2::Pool::builder()
		.build(manager)
		.map_err(|e| Error::Connection(e.to_string()))
}

/// Error that can occur when querying against the database
#[derive(Debug)]
pub enum Error {
	RecordAlreadyExists,
	RecordNotFound,
	ForeignKeyViolation,
	/// A serialization failure; the enclosing transaction may be retried
	Conflict,
	Connection(String),
	/// Used as a catch-all for everything diesel reports that we don't map
	DatabaseError(diesel::result::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::RecordAlreadyExists => write!(f, "record violates a unique constraint"),
			Error::RecordNotFound => write!(f, "record does not exist"),
			Error::ForeignKeyViolation => write!(f, "record references a missing record"),
			Error::Conflict => write!(f, "write conflicted with a concurrent transaction"),
			Error::Connection(e) => write!(f, "opening database connection: {}", e),
			Error::DatabaseError(e) => write!(f, "database error: {:?}", e),
		}
	}
}

impl PartialEq for Error {
	fn eq(&self, other: &Error) -> bool {
		use Error::*;
		match (self, other) {
			(RecordAlreadyExists, RecordAlreadyExists)
			| (RecordNotFound, RecordNotFound)
			| (ForeignKeyViolation, ForeignKeyViolation)
			| (Conflict, Conflict) => true,
			(Connection(a), Connection(b)) => a == b,
			(DatabaseError(a), DatabaseError(b)) => a.to_string() == b.to_string(),
			_ => false,
		}
	}
}

impl From<diesel::result::Error> for Error {
	fn from(e: diesel::result::Error) -> Self {
		match e {
			DatabaseError(UniqueViolation, _) => Error::RecordAlreadyExists,
			DatabaseError(ForeignKeyViolation, _) => Error::ForeignKeyViolation,
			DatabaseError(SerializationFailure, _) => Error::Conflict,
			NotFound => Error::RecordNotFound,

			_ => Error::DatabaseError(e),
		}
	}
}

impl From<diesel::r2d2::Error> for Error {
	fn from(e: diesel::r2d2::Error) -> Self {
		Error::Connection(e.to_string())
	}
}

impl From<diesel::r2d2::PoolError> for Error {
	fn from(e: diesel::r2d2::PoolError) -> Self {
		Error::Connection(e.to_string())
	}
}
