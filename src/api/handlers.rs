use warp::{Rejection, Reply};

use crate::auth::{self, Identity};
use crate::calendar::{Calendar, NewCalendar};
use crate::db;
use crate::error::{Error, Kind};
use crate::types::Id;
use crate::user::{NewUser, UserKey, UserUpdate};

use super::errors::{self, StatusResponse};
use super::schemas::*;
use super::Context;

/// Run blocking diesel work off the async reactor.
async fn blocking<T, F>(f: F) -> Result<T, Rejection>
where
	T: Send + 'static,
	F: FnOnce() -> crate::Result<T> + Send + 'static,
{
	let joined = tokio::task::spawn_blocking(f)
		.await
		.map_err(|e| errors::reject(Error::new(Kind::Internal(format!("worker panicked: {}", e)))))?;
	joined.map_err(errors::reject)
}

fn require_admin(identity: &Identity) -> Result<(), Rejection> {
	if identity.is_admin() {
		Ok(())
	} else {
		// Collection routes have no individual resource to hide; 401 here.
		Err(errors::reject(Error::new(Kind::Unauthenticated)))
	}
}

/// Load a calendar and check the identity may act on it. A foreign calendar
/// is reported exactly like a missing one.
fn owned_calendar(ctx: &Context, conn: &mut diesel::PgConnection, id: Id, identity: &Identity) -> crate::Result<Calendar> {
	let calendar = ctx.calendar_repo.find_by_id(conn, id)?;
	if !identity.owns_calendar(&calendar) {
		return Err(Error::new(Kind::Forbidden));
	}
	Ok(calendar)
}

pub async fn auth(ctx: Context, credentials: Credentials) -> Result<impl Reply, Rejection> {
	let token = blocking(move || {
		let conn = &mut ctx.conn()?;
		let identity = auth::authenticate(conn, &ctx.config, &credentials.username, &credentials.password)?;
		auth::issue_token(&ctx.config, &identity)
	})
	.await?;

	Ok(warp::reply::json(&AccessToken { access_token: token }))
}

pub async fn list_users(query: ListUsersQuery, identity: Identity, ctx: Context) -> Result<impl Reply, Rejection> {
	require_admin(&identity)?;

	let users = blocking(move || {
		let conn = &mut ctx.conn()?;
		ctx.user_repo.list(conn, &query.into()).map_err(Into::into)
	})
	.await?;

	let data: Vec<UserData> = users.into_iter().map(Into::into).collect();
	Ok(warp::reply::json(&data))
}

pub async fn create_user(identity: Identity, ctx: Context, body: UserToCreate) -> Result<impl Reply, Rejection> {
	require_admin(&identity)?;
	body.validate().map_err(errors::reject)?;

	let user = blocking(move || {
		let password_hash = auth::hash_password(&body.password)?;
		let conn = &mut ctx.conn()?;
		ctx.user_repo
			.create(
				conn,
				NewUser {
					email: &body.email,
					password_hash: &password_hash,
					first_name: &body.first_name,
					last_name: &body.last_name,
				},
			)
			.map_err(Into::into)
	})
	.await?;

	Ok(warp::reply::json(&UserData::from(user)))
}

pub async fn get_user(user_id: Id, identity: Identity, ctx: Context) -> Result<impl Reply, Rejection> {
	if !identity.owns_user(user_id) {
		return Err(errors::reject(Error::new(Kind::Forbidden)));
	}

	let user = blocking(move || {
		let conn = &mut ctx.conn()?;
		ctx.user_repo.find(conn, UserKey::Id(user_id)).map_err(Into::into)
	})
	.await?;

	Ok(warp::reply::json(&UserData::from(user)))
}

pub async fn update_user(user_id: Id, identity: Identity, ctx: Context, body: UserToUpdate) -> Result<impl Reply, Rejection> {
	if !identity.owns_user(user_id) {
		return Err(errors::reject(Error::new(Kind::Forbidden)));
	}
	body.validate().map_err(errors::reject)?;

	blocking(move || {
		let password_hash = match &body.password {
			Some(password) => Some(auth::hash_password(password)?),
			None => None,
		};
		let changes = UserUpdate {
			email: body.email,
			password_hash,
			first_name: body.first_name,
			last_name: body.last_name,
		};

		let conn = &mut ctx.conn()?;
		ctx.user_repo.find(conn, UserKey::Id(user_id))?;
		if !changes.is_empty() {
			ctx.user_repo.update(conn, user_id, changes)?;
		}
		Ok(())
	})
	.await?;

	Ok(warp::reply::json(&StatusResponse::ok()))
}

pub async fn delete_user(user_id: Id, identity: Identity, ctx: Context) -> Result<impl Reply, Rejection> {
	if !identity.owns_user(user_id) {
		return Err(errors::reject(Error::new(Kind::Forbidden)));
	}

	// Deleting an id that is already gone stays silent.
	blocking(move || {
		let conn = &mut ctx.conn()?;
		ctx.user_repo.delete(conn, user_id).map_err(Into::into)
	})
	.await?;

	Ok(warp::reply::json(&StatusResponse::ok()))
}

pub async fn list_calendars(identity: Identity, ctx: Context) -> Result<impl Reply, Rejection> {
	let calendars = blocking(move || {
		let conn = &mut ctx.conn()?;
		match identity {
			Identity::Admin => ctx.calendar_repo.list_all(conn),
			Identity::Owner(user_id) => ctx.calendar_repo.list_for_owner(conn, user_id),
		}
		.map_err(Into::into)
	})
	.await?;

	let data: Vec<CalendarData> = calendars.into_iter().map(Into::into).collect();
	Ok(warp::reply::json(&data))
}

pub async fn create_calendar(identity: Identity, ctx: Context, body: CalendarToCreate) -> Result<impl Reply, Rejection> {
	body.validate().map_err(errors::reject)?;

	let owner_id = match identity {
		Identity::Owner(user_id) => user_id,
		Identity::Admin => body.owner_uid.ok_or_else(|| {
			errors::reject(Error::new(Kind::Validation(
				"owner_uid is required when creating as admin".to_string(),
			)))
		})?,
	};

	let calendar = blocking(move || {
		let conn = &mut ctx.conn()?;
		ctx.calendar_repo
			.create(
				conn,
				NewCalendar {
					name: &body.name,
					case: 0,
					owner_id,
				},
			)
			.map_err(Into::into)
	})
	.await?;

	Ok(warp::reply::json(&CalendarData::from(calendar)))
}

pub async fn get_calendar(calendar_id: Id, identity: Identity, ctx: Context) -> Result<impl Reply, Rejection> {
	let calendar = blocking(move || {
		let conn = &mut ctx.conn()?;
		owned_calendar(&ctx, conn, calendar_id, &identity)
	})
	.await?;

	Ok(warp::reply::json(&CalendarData::from(calendar)))
}

pub async fn update_calendar(calendar_id: Id, identity: Identity, ctx: Context, body: CalendarToUpdate) -> Result<impl Reply, Rejection> {
	body.validate().map_err(errors::reject)?;

	blocking(move || {
		let conn = &mut ctx.conn()?;
		owned_calendar(&ctx, conn, calendar_id, &identity)?;
		ctx.calendar_repo.rename(conn, calendar_id, &body.name)?;
		Ok(())
	})
	.await?;

	Ok(warp::reply::json(&StatusResponse::ok()))
}

pub async fn delete_calendar(calendar_id: Id, identity: Identity, ctx: Context) -> Result<impl Reply, Rejection> {
	blocking(move || {
		let conn = &mut ctx.conn()?;
		match owned_calendar(&ctx, conn, calendar_id, &identity) {
			Ok(_) => {
				ctx.calendar_repo.delete(conn, calendar_id)?;
				Ok(())
			}
			// Already gone; deletion is idempotent.
			Err(e) if e.kind() == &Kind::Database(db::Error::RecordNotFound) => Ok(()),
			Err(e) => Err(e),
		}
	})
	.await?;

	Ok(warp::reply::json(&StatusResponse::ok()))
}

pub async fn send_case(calendar_id: Id, identity: Identity, ctx: Context, body: CaseToSend) -> Result<impl Reply, Rejection> {
	body.validate().map_err(errors::reject)?;

	let event = blocking(move || {
		ctx.ledger.send_case(calendar_id, body.to_calendar, body.case, &identity)
	})
	.await?;

	Ok(warp::reply::json(&EventData::from(event)))
}

pub async fn list_calendar_events(calendar_id: Id, identity: Identity, ctx: Context) -> Result<impl Reply, Rejection> {
	let events = blocking(move || {
		let conn = &mut ctx.conn()?;
		owned_calendar(&ctx, conn, calendar_id, &identity)?;
		ctx.event_repo.list_for_calendar(conn, calendar_id).map_err(Into::into)
	})
	.await?;

	let data: Vec<EventData> = events.into_iter().map(Into::into).collect();
	Ok(warp::reply::json(&data))
}
