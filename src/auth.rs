use diesel::PgConnection;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::calendar::Calendar;
use crate::config::Config;
use crate::error::{Error, Kind};
use crate::types::Id;
use crate::user::{self, UserKey};
use crate::Result;

const ROLE_ADMIN: &str = "admin";
const ROLE_USER: &str = "user";

/// The resolved principal of a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Identity {
	Admin,
	Owner(Id),
}

impl Identity {
	pub fn is_admin(&self) -> bool {
		matches!(self, Identity::Admin)
	}

	pub fn owns_user(&self, user_id: Id) -> bool {
		match self {
			Identity::Admin => true,
			Identity::Owner(id) => *id == user_id,
		}
	}

	pub fn owns_calendar(&self, calendar: &Calendar) -> bool {
		match self {
			Identity::Admin => true,
			Identity::Owner(id) => *id == calendar.owner_id,
		}
	}
}

/// Resolve a credential pair to an identity.
///
/// The admin path never touches the database; the user path resolves the
/// username as an email and verifies the bcrypt hash. Every failure collapses
/// into `Unauthenticated` so callers can't probe which emails exist.
pub fn authenticate(
	conn: &mut PgConnection,
	config: &Config,
	username: &str,
	password: &str,
) -> Result<Identity> {
	if username == config.admin_username {
		return if secrets_match(password, &config.admin_secret) {
			Ok(Identity::Admin)
		} else {
			Err(Error::new(Kind::Unauthenticated))
		};
	}

	let user = match user::Repo::new().find(conn, UserKey::Email(username)) {
		Ok(user) => user,
		Err(_) => return Err(Error::new(Kind::Unauthenticated)),
	};

	match bcrypt::verify(password, &user.password_hash) {
		Ok(true) => Ok(Identity::Owner(user.id)),
		_ => Err(Error::new(Kind::Unauthenticated)),
	}
}

/// Compares SHA-256 digests instead of the raw strings, so the comparison
/// takes the same time whatever prefix of the secret matches.
pub fn secrets_match(given: &str, expected: &str) -> bool {
	Sha256::digest(given.as_bytes()) == Sha256::digest(expected.as_bytes())
}

pub fn hash_password(password: &str) -> Result<String> {
	bcrypt::hash(password, bcrypt::DEFAULT_COST)
		.map_err(|e| Error::new(Kind::Internal(format!("hashing password: {}", e))))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	pub sub: String,
	pub role: String,
	pub exp: i64,
}

/// Issue the HS256 bearer token for an authenticated identity.
pub fn issue_token(config: &Config, identity: &Identity) -> Result<String> {
	let exp = chrono::Utc::now().timestamp() + config.token_ttl_secs;
	let claims = match identity {
		Identity::Admin => Claims {
			sub: ROLE_ADMIN.to_string(),
			role: ROLE_ADMIN.to_string(),
			exp,
		},
		Identity::Owner(id) => Claims {
			sub: id.to_string(),
			role: ROLE_USER.to_string(),
			exp,
		},
	};

	encode(
		&Header::default(),
		&claims,
		&EncodingKey::from_secret(config.token_secret.as_bytes()),
	)
	.map_err(|e| Error::new(Kind::Internal(format!("signing token: {}", e))))
}

/// Decode a bearer token back to the identity it was issued for.
/// Garbage, tampered, and expired tokens all map to `Unauthenticated`.
pub fn decode_token(config: &Config, token: &str) -> Result<Identity> {
	let data = decode::<Claims>(
		token,
		&DecodingKey::from_secret(config.token_secret.as_bytes()),
		&Validation::default(),
	)
	.map_err(|_| Error::new(Kind::Unauthenticated))?;

	identity_from_claims(&data.claims)
}

fn identity_from_claims(claims: &Claims) -> Result<Identity> {
	match claims.role.as_str() {
		ROLE_ADMIN => Ok(Identity::Admin),
		ROLE_USER => claims
			.sub
			.parse::<Id>()
			.map(Identity::Owner)
			.map_err(|_| Error::new(Kind::Unauthenticated)),
		_ => Err(Error::new(Kind::Unauthenticated)),
	}
}
