//! Maps crate errors onto the `{code, type, message}` envelope every caller
//! of this API expects, and hides what must stay hidden: an authorization
//! failure on a resource is indistinguishable from the resource not existing.

use std::convert::Infallible;

use log::error;
use serde::Serialize;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::db;
use crate::error::{Error, Kind};

/// Rejection wrapper carrying a crate error through warp.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl warp::reject::Reject for ApiError {}

pub fn reject(e: Error) -> Rejection {
	warp::reject::custom(ApiError(e))
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StatusResponse {
	pub code: u16,
	#[serde(rename = "type")]
	pub kind: String,
	pub message: String,
}

impl StatusResponse {
	pub fn ok() -> StatusResponse {
		StatusResponse {
			code: 200,
			kind: "OK".to_string(),
			message: "OK".to_string(),
		}
	}
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
	let (status, kind, message) = if let Some(ApiError(e)) = err.find::<ApiError>() {
		status_for(e)
	} else if err.is_not_found() || err.find::<warp::reject::MethodNotAllowed>().is_some() {
		(StatusCode::NOT_FOUND, "NOT_FOUND", "Not found: no such route".to_string())
	} else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
		(
			StatusCode::BAD_REQUEST,
			"VALIDATION_ERROR",
			format!("Validation error: {}", e),
		)
	} else {
		error!(target: "calendar::api", "unhandled rejection: {:?}", err);
		(
			StatusCode::INTERNAL_SERVER_ERROR,
			"SERVER_ERROR",
			format!("Server error: {:?}", err),
		)
	};

	if status == StatusCode::INTERNAL_SERVER_ERROR {
		error!(target: "calendar::api", "responding 500: {}", message);
	}

	let body = warp::reply::json(&StatusResponse {
		code: status.as_u16(),
		kind: kind.to_string(),
		message,
	});
	Ok(warp::reply::with_status(body, status))
}

fn status_for(e: &Error) -> (StatusCode, &'static str, String) {
	match e.kind() {
		Kind::Validation(msg) => (
			StatusCode::BAD_REQUEST,
			"VALIDATION_ERROR",
			format!("Validation error: {}", msg),
		),
		Kind::Unauthenticated => (
			StatusCode::UNAUTHORIZED,
			"NOT_AUTHORIZED",
			"Not authorized".to_string(),
		),
		// Information hiding: an identity that may not touch a resource
		// learns nothing beyond "not found".
		Kind::Forbidden => (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found".to_string()),
		Kind::InsufficientCase => (
			StatusCode::BAD_REQUEST,
			"INSUFFICIENT_CASE",
			"not enough case in calendar".to_string(),
		),
		Kind::Database(db::Error::RecordNotFound) | Kind::Database(db::Error::ForeignKeyViolation) => (
			StatusCode::NOT_FOUND,
			"NOT_FOUND",
			format!("Not found: {}", e),
		),
		Kind::Database(db::Error::RecordAlreadyExists) => (
			StatusCode::CONFLICT,
			"CONFLICT",
			format!("Conflict: {}", e),
		),
		Kind::Database(db::Error::Conflict) => (
			StatusCode::CONFLICT,
			"CONFLICT",
			"Conflict: concurrent update, retry the request".to_string(),
		),
		Kind::Database(_) | Kind::Config(_) | Kind::Internal(_) => (
			StatusCode::INTERNAL_SERVER_ERROR,
			"SERVER_ERROR",
			format!("Server error: {}", e),
		),
	}
}
