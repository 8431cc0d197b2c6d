#[path = "../common.rs"]
mod common;

mod calendar;
mod event;
