use chrono::{DateTime, Utc};

pub type Id = i32;
pub type Time = DateTime<Utc>;
