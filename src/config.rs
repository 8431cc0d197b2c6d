use std::env;
use std::net::SocketAddr;

use dotenv::dotenv;

use crate::error::{Error, Kind};
use crate::Result;

/// Administrative username carried over from the original deployment.
pub const DEFAULT_ADMIN_USERNAME: &str =
	"admin-aec8084845b41a6952d46cbaa1c9b798659487ffd133796d95d05ba45d9096c2";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3030";
const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Runtime configuration, read once from the environment at startup.
///
/// Loads a `.env` file from the working directory when present.
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub listen_addr: SocketAddr,
	pub admin_username: String,
	pub admin_secret: String,
	pub token_secret: String,
	pub token_ttl_secs: i64,
	/// When true (the default), a transfer may drive the source calendar's
	/// case below zero.
	pub allow_overdraft: bool,
}

impl Config {
	pub fn from_env() -> Result<Config> {
		dotenv().ok();

		let listen_addr = env::var("LISTEN_ADDR")
			.unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
			.parse::<SocketAddr>()
			.map_err(|e| config_err(format!("LISTEN_ADDR: {}", e)))?;

		let token_ttl_secs = match env::var("TOKEN_TTL_SECS") {
			Ok(v) => v
				.parse::<i64>()
				.map_err(|e| config_err(format!("TOKEN_TTL_SECS: {}", e)))?,
			Err(_) => DEFAULT_TOKEN_TTL_SECS,
		};

		let allow_overdraft = match env::var("ALLOW_OVERDRAFT") {
			Ok(v) => parse_bool(&v)
				.ok_or_else(|| config_err(format!("ALLOW_OVERDRAFT: invalid boolean {:?}", v)))?,
			Err(_) => true,
		};

		Ok(Config {
			database_url: required("DATABASE_URL")?,
			listen_addr,
			admin_username: env::var("ADMIN_USERNAME")
				.unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string()),
			admin_secret: required("ADMIN_SECRET")?,
			token_secret: required("TOKEN_SECRET")?,
			token_ttl_secs,
			allow_overdraft,
		})
	}
}

fn required(name: &str) -> Result<String> {
	env::var(name).map_err(|_| config_err(format!("{} must be set", name)))
}

fn config_err(msg: String) -> Error {
	Error::new(Kind::Config(msg))
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}
