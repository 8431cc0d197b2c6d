use std::fmt;

use crate::db;

/// An error that can occur in this crate
#[derive(Debug, PartialEq)]
pub struct Error {
	kind: Kind,
}

impl Error {
	pub fn new(kind: Kind) -> Error {
		Error { kind }
	}

	pub fn kind(&self) -> &Kind {
		&self.kind
	}

	pub fn into_kind(self) -> Kind {
		self.kind
	}
}

/// The kind of an error that can occur.
#[derive(Debug, PartialEq)]
pub enum Kind {
	Database(db::Error),
	/// Malformed or missing input; the caller can fix the request
	Validation(String),
	/// Startup configuration is missing or malformed
	Config(String),
	/// The credential did not resolve to an identity
	Unauthenticated,
	/// The identity is not allowed to act on the target resource
	Forbidden,
	/// The source calendar does not hold enough case for the transfer
	InsufficientCase,
	/// Anything unanticipated; surfaced as a 500 at the boundary
	Internal(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.kind {
			Kind::Database(e) => write!(f, "db error: {}", e),
			Kind::Validation(msg) => write!(f, "invalid input: {}", msg),
			Kind::Config(msg) => write!(f, "configuration: {}", msg),
			Kind::Unauthenticated => write!(f, "credentials did not resolve to an identity"),
			Kind::Forbidden => write!(f, "identity may not act on this resource"),
			Kind::InsufficientCase => write!(f, "not enough case in calendar"),
			Kind::Internal(msg) => write!(f, "internal error: {}", msg),
		}
	}
}

impl From<db::Error> for Error {
	fn from(e: db::Error) -> Self {
		Error::new(Kind::Database(e))
	}
}

impl From<diesel::result::Error> for Error {
	fn from(e: diesel::result::Error) -> Self {
		Error::new(Kind::Database(db::Error::from(e)))
	}
}

impl From<diesel::r2d2::PoolError> for Error {
	fn from(e: diesel::r2d2::PoolError) -> Self {
		Error::new(Kind::Database(db::Error::from(e)))
	}
}
