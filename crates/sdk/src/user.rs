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

//! User API: subscription and application management

use crate::client::{Client, ClientError};
use crate::signing::url_encode;
use crate::types::{ApiRequest, FeatureMode, LatchResponse};

/// Fields of an application as sent on create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationParams {
	pub name: String,
	pub two_factor: FeatureMode,
	pub lock_on_request: FeatureMode,
	pub contact_phone: String,
	pub contact_email: String,
}

impl ApplicationParams {
	fn apply(&self, request: ApiRequest) -> ApiRequest {
		request
			.param("name", self.name.as_str())
			.param("two_factor", self.two_factor.as_str())
			.param("lock_on_request", self.lock_on_request.as_str())
			.param("contactPhone", self.contact_phone.as_str())
			.param("contactEmail", self.contact_email.as_str())
	}
}

/// Request builders for the user API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEndpoints {
	base: String,
}

impl UserEndpoints {
	pub fn new(base: impl Into<String>) -> Self {
		Self { base: base.into() }
	}

	fn application_url(&self) -> String {
		format!("{}/application", self.base)
	}

	pub fn get_subscription(&self) -> ApiRequest {
		ApiRequest::get(format!("{}/subscription", self.base))
	}

	pub fn get_applications(&self) -> ApiRequest {
		ApiRequest::get(self.application_url())
	}

	pub fn create_application(&self, params: &ApplicationParams) -> ApiRequest {
		params.apply(ApiRequest::put(self.application_url()))
	}

	pub fn update_application(&self, application_id: &str, params: &ApplicationParams) -> ApiRequest {
		params.apply(ApiRequest::post(format!(
			"{}/{}",
			self.application_url(),
			url_encode(application_id)
		)))
	}

	pub fn remove_application(&self, application_id: &str) -> ApiRequest {
		ApiRequest::delete(format!(
			"{}/{}",
			self.application_url(),
			url_encode(application_id)
		))
	}
}

/// User API client
#[derive(Debug, Clone)]
pub struct LatchUser {
	client: Client,
	endpoints: UserEndpoints,
}

impl LatchUser {
	pub fn new(client: Client) -> Self {
		let endpoints = UserEndpoints::new(client.config().api_base_path());
		Self { client, endpoints }
	}

	pub fn endpoints(&self) -> &UserEndpoints {
		&self.endpoints
	}

	pub async fn get_subscription(&self) -> Result<LatchResponse, ClientError> {
		self.client.execute(&self.endpoints.get_subscription()).await
	}

	pub async fn get_applications(&self) -> Result<LatchResponse, ClientError> {
		self.client.execute(&self.endpoints.get_applications()).await
	}

	pub async fn create_application(
		&self,
		params: &ApplicationParams,
	) -> Result<LatchResponse, ClientError> {
		self.client
			.execute(&self.endpoints.create_application(params))
			.await
	}

	pub async fn update_application(
		&self,
		application_id: &str,
		params: &ApplicationParams,
	) -> Result<LatchResponse, ClientError> {
		self.client
			.execute(&self.endpoints.update_application(application_id, params))
			.await
	}

	pub async fn remove_application(
		&self,
		application_id: &str,
	) -> Result<LatchResponse, ClientError> {
		self.client
			.execute(&self.endpoints.remove_application(application_id))
			.await
	}
}
