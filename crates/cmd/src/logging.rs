// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging initialization for the Latch CLI
//!
//! Logs go to stderr so that stdout only carries command output.
//!
//! # Configuration
//!
//! - `RUST_LOG`: Log level filter (default: `info`)
//!   - Example: `RUST_LOG=latch_sdk=debug` prints every signed request
//!
//! - `LOG_TO_FILE`: Also write logs to a daily rolling file (default: `false`)
//!   - Set to `true`, `1`, or `yes` to enable
//!
//! - `LOG_DIR`: Root directory for log files (default: `./logs`)
//!   - Files are created as `{LOG_DIR}/latch/latch.{date}.log`

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_FILE, LOG_COMPONENT_NAME};

// Keeps the background writer alive until exit
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix(".log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize logging with stderr output and optional file output
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let log_to_file = env::var("LOG_TO_FILE")
		.map(|v| v == "true" || v == "1" || v == "yes")
		.unwrap_or(DEFAULT_LOG_TO_FILE);

	let subscriber = Registry::default().with(filter).with(
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_target(true)
			.with_ansi(true),
	);

	if log_to_file {
		let log_root = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
		let log_dir = Path::new(&log_root).join(LOG_COMPONENT_NAME);
		std::fs::create_dir_all(&log_dir)
			.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

		let file_writer = setup_file_logging(&log_dir)?;
		subscriber
			.with(
				fmt::layer()
					.with_writer(file_writer)
					.with_timer(fmt::time::UtcTime::rfc_3339())
					.with_thread_ids(true)
					.with_target(true)
					.with_ansi(false),
			)
			.try_init()
			.context("Failed to install tracing subscriber")?;
	} else {
		subscriber
			.try_init()
			.context("Failed to install tracing subscriber")?;
	}

	Ok(())
}
