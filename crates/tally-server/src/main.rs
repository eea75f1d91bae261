// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tally authorization engine operator binary.

use std::path::PathBuf;

use clap::Parser;
use tally_server_permissions::{PermissionService, PermissionServiceOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Command;

/// Tally server - seed, inspect and query organization permissions.
#[derive(Parser, Debug)]
#[command(
	name = "tally-server",
	about = "Tally authorization engine",
	version
)]
struct Args {
	/// Config file to use instead of /etc/tally/server.toml
	#[arg(long, env = "TALLY_SERVER_CONFIG")]
	config: Option<PathBuf>,

	/// Emit logs as JSON
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => tally_server_config::load_config_with_file(path)?,
		None => tally_server_config::load_config()?,
	};

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	if args.json_logs {
		registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}

	tracing::debug!(database = %config.database.url, "starting tally-server");

	let pool = tally_server_permissions::create_pool(&config.database.url).await?;
	tally_server_permissions::run_migrations(&pool).await?;

	let service = PermissionService::sqlite(pool).with_options(PermissionServiceOptions {
		log_decisions: config.permissions.log_decisions,
		seed_on_initialize: config.permissions.seed_on_initialize,
	});

	let output = commands::run(&service, args.command).await?;
	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}
