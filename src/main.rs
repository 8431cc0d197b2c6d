use std::process;

use log::*;
use warp::filters::log::Info;
use warp::Filter;

use calendar_api::api;
use calendar_api::config::Config;
use calendar_api::db;

#[tokio::main]
async fn main() {
	pretty_env_logger::init();

	let config = match Config::from_env() {
		Ok(config) => config,
		Err(e) => {
			error!(target: "calendar::api", "configuration error: {}", e);
			process::exit(1);
		}
	};

	let pool = match db::pg_pool(&config.database_url) {
		Ok(pool) => pool,
		Err(e) => {
			error!(target: "calendar::api", "database error: {}", e);
			process::exit(1);
		}
	};

	let addr = config.listen_addr;
	let ctx = api::Context::new(pool, config);

	let log = warp::log::custom(|info: Info| {
		info!(
			target: "calendar::api",
			"\"{} {} {:?}\" \t{} {} {:?}",
			info.method(),
			info.path(),
			info.version(),
			info.status().canonical_reason().unwrap_or("-"),
			info.status().as_u16(),
			info.elapsed(),
		);
	});

	info!(target: "calendar::api", "listening on {}", addr);
	warp::serve(api::routes(ctx).with(log)).run(addr).await;
}
