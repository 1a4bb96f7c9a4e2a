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

//! Application API: pairing, status checks, locks, history and operations
//!
//! [`AppEndpoints`] only builds requests and can be tested without a network.
//! [`LatchApp`] sends them through a shared [`Client`].

use crate::client::{Client, ClientError};
use crate::signing::url_encode;
use crate::types::{ApiRequest, FeatureMode, LatchResponse};

/// Options for a status check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusOptions {
	/// Check an operation instead of the whole application
	pub operation_id: Option<String>,
	/// Do not push lock/unlock notifications to the user's devices
	pub silent: bool,
	/// Do not generate a one-time password
	pub no_otp: bool,
}

impl StatusOptions {
	pub fn operation(mut self, operation_id: impl Into<String>) -> Self {
		self.operation_id = Some(operation_id.into());
		self
	}

	pub fn silent(mut self) -> Self {
		self.silent = true;
		self
	}

	pub fn no_otp(mut self) -> Self {
		self.no_otp = true;
		self
	}
}

/// Request builders for the application API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEndpoints {
	base: String,
}

impl AppEndpoints {
	/// `base` is the versioned API root, e.g. `/api/1.0`
	pub fn new(base: impl Into<String>) -> Self {
		Self { base: base.into() }
	}

	fn url(&self, resource: &str) -> String {
		format!("{}/{}", self.base, resource)
	}

	/// Pair an account by name (test backend only)
	pub fn pair_with_id(&self, id: &str) -> ApiRequest {
		ApiRequest::get(format!("{}/{}", self.url("pairWithId"), url_encode(id)))
	}

	/// Pair an account with the token shown in the mobile app
	pub fn pair(&self, token: &str) -> ApiRequest {
		ApiRequest::get(format!("{}/{}", self.url("pair"), url_encode(token)))
	}

	pub fn status(&self, account_id: &str, options: &StatusOptions) -> ApiRequest {
		let mut path = self.status_path(account_id, options.operation_id.as_deref());
		if options.no_otp {
			path.push_str("/nootp");
		}
		if options.silent {
			path.push_str("/silent");
		}
		ApiRequest::get(path)
	}

	/// Status check that supplies the OTP and/or its message
	pub fn status_with_otp(
		&self,
		account_id: &str,
		operation_id: Option<&str>,
		silent: bool,
		otp_token: Option<&str>,
		otp_message: Option<&str>,
	) -> ApiRequest {
		let mut path = self.status_path(account_id, operation_id);
		if silent {
			path.push_str("/silent");
		}
		ApiRequest::post(path)
			.param_opt("otp", otp_token)
			.param_opt("msg", otp_message)
	}

	pub fn unpair(&self, account_id: &str) -> ApiRequest {
		ApiRequest::get(format!("{}/{}", self.url("unpair"), url_encode(account_id)))
	}

	pub fn lock(&self, account_id: &str, operation_id: Option<&str>) -> ApiRequest {
		ApiRequest::post(self.account_path("lock", account_id, operation_id))
	}

	pub fn unlock(&self, account_id: &str, operation_id: Option<&str>) -> ApiRequest {
		ApiRequest::post(self.account_path("unlock", account_id, operation_id))
	}

	pub fn history(&self, account_id: &str) -> ApiRequest {
		ApiRequest::get(format!("{}/{}", self.url("history"), url_encode(account_id)))
	}

	/// History between two instants, in milliseconds since the epoch
	pub fn history_between(&self, account_id: &str, from_millis: i64, to_millis: i64) -> ApiRequest {
		ApiRequest::get(format!(
			"{}/{}/{}/{}",
			self.url("history"),
			url_encode(account_id),
			from_millis,
			to_millis
		))
	}

	pub fn get_operations(&self, parent_operation_id: Option<&str>) -> ApiRequest {
		match parent_operation_id {
			Some(parent) => ApiRequest::get(format!("{}/{}", self.url("operation"), url_encode(parent))),
			None => ApiRequest::get(self.url("operation")),
		}
	}

	pub fn create_operation(
		&self,
		parent_id: &str,
		name: &str,
		two_factor: FeatureMode,
		lock_on_request: FeatureMode,
	) -> ApiRequest {
		ApiRequest::put(self.url("operation"))
			.param("parentId", parent_id)
			.param("name", name)
			.param("two_factor", two_factor.as_str())
			.param("lock_on_request", lock_on_request.as_str())
	}

	/// Change any of name, two-factor mode or lock-on-request mode
	pub fn update_operation(
		&self,
		operation_id: &str,
		name: Option<&str>,
		two_factor: Option<FeatureMode>,
		lock_on_request: Option<FeatureMode>,
	) -> ApiRequest {
		ApiRequest::post(format!("{}/{}", self.url("operation"), url_encode(operation_id)))
			.param_opt("name", name)
			.param_opt("two_factor", two_factor.map(|m| m.as_str()))
			.param_opt("lock_on_request", lock_on_request.map(|m| m.as_str()))
	}

	pub fn remove_operation(&self, operation_id: &str) -> ApiRequest {
		ApiRequest::delete(format!("{}/{}", self.url("operation"), url_encode(operation_id)))
	}

	fn status_path(&self, account_id: &str, operation_id: Option<&str>) -> String {
		self.account_path("status", account_id, operation_id)
	}

	fn account_path(&self, resource: &str, account_id: &str, operation_id: Option<&str>) -> String {
		let mut path = format!("{}/{}", self.url(resource), url_encode(account_id));
		if let Some(operation_id) = operation_id.filter(|op| !op.is_empty()) {
			path.push_str("/op/");
			path.push_str(&url_encode(operation_id));
		}
		path
	}
}

/// Application API client
#[derive(Debug, Clone)]
pub struct LatchApp {
	client: Client,
	endpoints: AppEndpoints,
}

impl LatchApp {
	pub fn new(client: Client) -> Self {
		let endpoints = AppEndpoints::new(client.config().api_base_path());
		Self { client, endpoints }
	}

	pub fn endpoints(&self) -> &AppEndpoints {
		&self.endpoints
	}

	pub async fn pair_with_id(&self, id: &str) -> Result<LatchResponse, ClientError> {
		self.client.execute(&self.endpoints.pair_with_id(id)).await
	}

	pub async fn pair(&self, token: &str) -> Result<LatchResponse, ClientError> {
		self.client.execute(&self.endpoints.pair(token)).await
	}

	pub async fn status(
		&self,
		account_id: &str,
		options: &StatusOptions,
	) -> Result<LatchResponse, ClientError> {
		self.client
			.execute(&self.endpoints.status(account_id, options))
			.await
	}

	pub async fn status_with_otp(
		&self,
		account_id: &str,
		operation_id: Option<&str>,
		silent: bool,
		otp_token: Option<&str>,
		otp_message: Option<&str>,
	) -> Result<LatchResponse, ClientError> {
		let request =
			self.endpoints
				.status_with_otp(account_id, operation_id, silent, otp_token, otp_message);
		self.client.execute(&request).await
	}

	pub async fn unpair(&self, account_id: &str) -> Result<LatchResponse, ClientError> {
		self.client.execute(&self.endpoints.unpair(account_id)).await
	}

	pub async fn lock(
		&self,
		account_id: &str,
		operation_id: Option<&str>,
	) -> Result<LatchResponse, ClientError> {
		self.client
			.execute(&self.endpoints.lock(account_id, operation_id))
			.await
	}

	pub async fn unlock(
		&self,
		account_id: &str,
		operation_id: Option<&str>,
	) -> Result<LatchResponse, ClientError> {
		self.client
			.execute(&self.endpoints.unlock(account_id, operation_id))
			.await
	}

	pub async fn history(&self, account_id: &str) -> Result<LatchResponse, ClientError> {
		self.client.execute(&self.endpoints.history(account_id)).await
	}

	/// `from` defaults to the epoch and `to` to now
	pub async fn history_between(
		&self,
		account_id: &str,
		from_millis: Option<i64>,
		to_millis: Option<i64>,
	) -> Result<LatchResponse, ClientError> {
		let from = from_millis.unwrap_or(0);
		let to = to_millis.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
		self.client
			.execute(&self.endpoints.history_between(account_id, from, to))
			.await
	}

	pub async fn get_operations(
		&self,
		parent_operation_id: Option<&str>,
	) -> Result<LatchResponse, ClientError> {
		self.client
			.execute(&self.endpoints.get_operations(parent_operation_id))
			.await
	}

	pub async fn create_operation(
		&self,
		parent_id: &str,
		name: &str,
		two_factor: FeatureMode,
		lock_on_request: FeatureMode,
	) -> Result<LatchResponse, ClientError> {
		let request = self
			.endpoints
			.create_operation(parent_id, name, two_factor, lock_on_request);
		self.client.execute(&request).await
	}

	pub async fn update_operation(
		&self,
		operation_id: &str,
		name: Option<&str>,
		two_factor: Option<FeatureMode>,
		lock_on_request: Option<FeatureMode>,
	) -> Result<LatchResponse, ClientError> {
		let request = self
			.endpoints
			.update_operation(operation_id, name, two_factor, lock_on_request);
		self.client.execute(&request).await
	}

	pub async fn remove_operation(&self, operation_id: &str) -> Result<LatchResponse, ClientError> {
		self.client
			.execute(&self.endpoints.remove_operation(operation_id))
			.await
	}
}
