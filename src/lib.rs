#[macro_use]
extern crate diesel;

pub mod api;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod event;
pub mod ledger;
pub mod schema;
pub mod types;
pub mod user;

pub use crate::error::{Error, Kind};

pub type Result<T> = std::result::Result<T, Error>;
