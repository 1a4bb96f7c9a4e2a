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

use std::{env, time::Duration};

use anyhow::{Context, Result, bail};
use latch_sdk::{
	Credential, LatchConfig,
	config::{DEFAULT_API_HOST, DEFAULT_API_VERSION, DEFAULT_TIMEOUT_SECS},
};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "latch";

/// Default file output enabled (can be overridden by LOG_TO_FILE environment variable)
pub const DEFAULT_LOG_TO_FILE: bool = false;

// Credential environment variables
pub const ENV_APP_ID: &str = "LATCH_APP_ID";
pub const ENV_SECRET_KEY: &str = "LATCH_SECRET_KEY";
pub const ENV_HOST: &str = "LATCH_HOST";
pub const ENV_API_VERSION: &str = "LATCH_API_VERSION";
pub const ENV_TIMEOUT_SECS: &str = "LATCH_TIMEOUT_SECS";

/// Settings for one CLI invocation
#[derive(Debug, Clone)]
pub struct CliConfig {
	pub credential: Credential,
	pub latch: LatchConfig,
}

impl CliConfig {
	/// Load credentials and connection settings from the environment (and `.env`)
	///
	/// `host_override` takes precedence over `LATCH_HOST`.
	pub fn from_env(host_override: Option<&str>) -> Result<Self> {
		dotenv::dotenv().ok();

		let app_id = require_var(ENV_APP_ID)?;
		let secret_key = require_var(ENV_SECRET_KEY)?;

		let host = match host_override {
			Some(host) => host.to_string(),
			None => env::var(ENV_HOST).unwrap_or_else(|_| DEFAULT_API_HOST.to_string()),
		};

		let api_version =
			env::var(ENV_API_VERSION).unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

		let timeout_secs = match env::var(ENV_TIMEOUT_SECS) {
			Ok(value) => value
				.parse()
				.with_context(|| format!("Invalid {}: {}", ENV_TIMEOUT_SECS, value))?,
			Err(_) => DEFAULT_TIMEOUT_SECS,
		};

		let latch = LatchConfig::new()
			.with_host(host)
			.with_api_version(api_version)
			.with_timeout(Duration::from_secs(timeout_secs));
		latch.validate().context("Invalid Latch configuration")?;

		Ok(Self {
			credential: Credential::new(app_id, secret_key),
			latch,
		})
	}
}

fn require_var(name: &str) -> Result<String> {
	match env::var(name) {
		Ok(value) if !value.trim().is_empty() => Ok(value),
		Ok(_) => bail!("{} is set but empty", name),
		Err(_) => bail!("{} must be set", name),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_log_level_is_info() {
		assert_eq!(DEFAULT_LOG_LEVEL, "info");
	}
}
