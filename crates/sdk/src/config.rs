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

//! Per-client configuration
//!
//! Each [`Client`](crate::Client) owns its own `LatchConfig`; there is no
//! process-wide host setting.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Latch backend
pub const DEFAULT_API_HOST: &str = "https://latch.elevenpaths.com";

/// Default API version used in request paths
pub const DEFAULT_API_VERSION: &str = "1.0";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error types for configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	#[error("API host can not be empty")]
	EmptyHost,
	#[error("API version can not be empty")]
	EmptyApiVersion,
	#[error("Application ID can not be empty")]
	EmptyAppId,
	#[error("Secret key can not be empty")]
	EmptySecretKey,
}

/// Connection settings for a Latch client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatchConfig {
	/// Backend base URL without trailing slash
	pub host: String,
	/// API version segment, e.g. `1.0`
	pub api_version: String,
	/// Timeout for a whole HTTP exchange
	#[serde(with = "duration_secs")]
	pub timeout: Duration,
}

impl Default for LatchConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_API_HOST.to_string(),
			api_version: DEFAULT_API_VERSION.to_string(),
			timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
		}
	}
}

impl LatchConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the backend host, e.g. `https://latch.elevenpaths.com`
	///
	/// Trailing slashes are removed.
	pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
		self.host = host.as_ref().trim_end_matches('/').to_string();
		self
	}

	pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
		self.api_version = api_version.into();
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.host.trim().trim_end_matches('/').is_empty() {
			return Err(ConfigError::EmptyHost);
		}
		if self.api_version.trim().is_empty() {
			return Err(ConfigError::EmptyApiVersion);
		}
		Ok(())
	}

	/// `/api/<version>`
	pub fn api_base_path(&self) -> String {
		format!("/api/{}", self.api_version)
	}

	/// Absolute URL for a path starting with `/`
	///
	/// The host is trimmed here too, since a deserialized config never went
	/// through [`LatchConfig::with_host`].
	pub fn url_for(&self, path: &str) -> String {
		format!("{}{}", self.host.trim_end_matches('/'), path)
	}
}

mod duration_secs {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(value.as_secs())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_secs)
	}
}
