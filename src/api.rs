//! The HTTP surface: route registration, bearer-token extraction, and the
//! shared request context handed to every handler.

use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::auth::{self, Identity};
use crate::calendar;
use crate::config::Config;
use crate::db::{PgPool, PooledPg};
use crate::error::{Error, Kind};
use crate::event;
use crate::ledger;
use crate::types::Id;
use crate::user;

pub mod errors;
pub mod handlers;
pub mod schemas;

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Everything a handler needs, cloned cheaply per request.
#[derive(Clone)]
pub struct Context {
	pub db: PgPool,
	pub config: Arc<Config>,
	pub user_repo: user::Repo,
	pub calendar_repo: calendar::Repo,
	pub event_repo: event::Repo,
	pub ledger: ledger::Service,
}

impl Context {
	pub fn new(db: PgPool, config: Config) -> Context {
		let calendar_repo = calendar::Repo::new();
		let event_repo = event::Repo::new();
		let ledger = ledger::Service::new(ledger::NewService {
			db: db.clone(),
			calendar_repo,
			event_repo,
			allow_overdraft: config.allow_overdraft,
		});

		Context {
			db,
			config: Arc::new(config),
			user_repo: user::Repo::new(),
			calendar_repo,
			event_repo,
			ledger,
		}
	}

	pub fn conn(&self) -> crate::Result<PooledPg> {
		self.db.get().map_err(Into::into)
	}
}

/// The full route table, with rejections already rendered to the JSON
/// envelope.
pub fn routes(ctx: Context) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
	let auth = warp::path!("auth")
		.and(warp::post())
		.and(with_context(ctx.clone()))
		.and(json_body())
		.and_then(handlers::auth);

	let list_users = warp::path!("user")
		.and(warp::get())
		.and(warp::query::<schemas::ListUsersQuery>())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and_then(handlers::list_users);

	let create_user = warp::path!("user")
		.and(warp::post())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and(json_body())
		.and_then(handlers::create_user);

	let get_user = warp::path!("user" / Id)
		.and(warp::get())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and_then(handlers::get_user);

	let update_user = warp::path!("user" / Id)
		.and(warp::put())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and(json_body())
		.and_then(handlers::update_user);

	let delete_user = warp::path!("user" / Id)
		.and(warp::delete())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and_then(handlers::delete_user);

	let list_calendars = warp::path!("calendar")
		.and(warp::get())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and_then(handlers::list_calendars);

	let create_calendar = warp::path!("calendar")
		.and(warp::post())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and(json_body())
		.and_then(handlers::create_calendar);

	let get_calendar = warp::path!("calendar" / Id)
		.and(warp::get())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and_then(handlers::get_calendar);

	let update_calendar = warp::path!("calendar" / Id)
		.and(warp::put())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and(json_body())
		.and_then(handlers::update_calendar);

	let delete_calendar = warp::path!("calendar" / Id)
		.and(warp::delete())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and_then(handlers::delete_calendar);

	let send_case = warp::path!("calendar" / Id / "send-case")
		.and(warp::post())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx.clone()))
		.and(json_body())
		.and_then(handlers::send_case);

	let list_calendar_events = warp::path!("calendar" / Id / "events")
		.and(warp::get())
		.and(with_identity(ctx.clone()))
		.and(with_context(ctx))
		.and_then(handlers::list_calendar_events);

	auth.or(list_users)
		.or(create_user)
		.or(get_user)
		.or(update_user)
		.or(delete_user)
		.or(list_calendars)
		.or(create_calendar)
		.or(get_calendar)
		.or(update_calendar)
		.or(delete_calendar)
		.or(send_case)
		.or(list_calendar_events)
		.recover(errors::handle_rejection)
}

fn with_context(ctx: Context) -> impl Filter<Extract = (Context,), Error = std::convert::Infallible> + Clone {
	warp::any().map(move || ctx.clone())
}

fn json_body<T: serde::de::DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
	warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Turn the Authorization header into an identity; requests without a valid
/// token never reach a handler.
fn with_identity(ctx: Context) -> impl Filter<Extract = (Identity,), Error = Rejection> + Clone {
	warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
		let ctx = ctx.clone();
		async move {
			let token = header
				.as_deref()
				.and_then(bearer_token)
				.ok_or_else(|| errors::reject(Error::new(Kind::Unauthenticated)))?;

			auth::decode_token(&ctx.config, token).map_err(errors::reject)
		}
	})
}

/// Deployed clients still send the original `JWT` scheme; accept both.
fn bearer_token(header: &str) -> Option<&str> {
	header
		.strip_prefix("Bearer ")
		.or_else(|| header.strip_prefix("JWT "))
}
