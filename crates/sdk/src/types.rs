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

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::signing::HttpMethod;

/// Two-factor / lock-on-request mode of an operation or application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureMode {
	Mandatory,
	OptIn,
	Disabled,
}

impl FeatureMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			FeatureMode::Mandatory => "MANDATORY",
			FeatureMode::OptIn => "OPT_IN",
			FeatureMode::Disabled => "DISABLED",
		}
	}
}

impl fmt::Display for FeatureMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error reported by the Latch service inside a response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
	/// Latch error code (e.g. 201 for "account not paired")
	pub code: i32,
	/// Human readable message
	pub message: String,
}

impl ApiError {
	pub fn new(code: i32, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "E{} - {}", self.code, self.message)
	}
}

/// Decoded Latch response envelope
///
/// The service answers `{"data": {...}}` on success and
/// `{"error": {"code": ..., "message": ...}}` on failure. Both may be absent
/// (e.g. unpair returns `{}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatchResponse {
	pub data: Option<Map<String, Value>>,
	pub error: Option<ApiError>,
}

#[derive(Deserialize)]
struct RawResponse {
	#[serde(default)]
	data: Option<Map<String, Value>>,
	#[serde(default)]
	error: Option<Value>,
}

impl LatchResponse {
	/// Parse a response body
	///
	/// An `error` that is not an object, or whose `code` is neither an
	/// integer nor a numeric string, is dropped.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		let raw: RawResponse = serde_json::from_str(json)?;
		let error = raw.error.and_then(|err| {
			let err = err.as_object()?;
			let code = match err.get("code")? {
				Value::Number(n) => i32::try_from(n.as_i64()?).ok()?,
				Value::String(s) => s.trim().parse().ok()?,
				_ => return None,
			};
			let message = match err.get("message") {
				Some(Value::String(s)) => s.clone(),
				Some(other) => other.to_string(),
				None => String::new(),
			};
			Some(ApiError { code, message })
		});

		Ok(Self {
			data: raw.data,
			error,
		})
	}

	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	/// Look up a top-level field of `data`
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.data.as_ref()?.get(key)
	}
}

/// An unsigned call to the Latch API
///
/// Endpoint modules build these. The client signs and sends them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
	pub method: HttpMethod,
	/// Path from the first `/`, already url-encoded
	pub path: String,
	/// Form body parameters (url-decoded)
	pub params: BTreeMap<String, String>,
}

impl ApiRequest {
	pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			params: BTreeMap::new(),
		}
	}

	pub fn get(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Get, path)
	}

	pub fn post(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Post, path)
	}

	pub fn put(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Put, path)
	}

	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Delete, path)
	}

	pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());
		self
	}

	/// Insert the parameter only when `value` is present and non-empty
	pub fn param_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
		match value.map(Into::into) {
			Some(value) if !value.is_empty() => self.param(name, value),
			_ => self,
		}
	}
}
