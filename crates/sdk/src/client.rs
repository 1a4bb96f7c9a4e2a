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

use std::collections::HashMap;

use reqwest::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, LatchConfig};
use crate::signing::{
	Credential, HttpMethod, SignableRequest, SignedHeaders, SigningError, serialize_params,
	sign_request,
};
use crate::types::{ApiRequest, LatchResponse};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Configuration error: {0}")]
	Configuration(#[from] ConfigError),
	#[error("Signing error: {0}")]
	Signing(#[from] SigningError),
	#[error("Network error: {0}")]
	Network(String),
	#[error("Server error: {0}")]
	Server(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// Signed HTTP client for the Latch API
///
/// Holds one credential and one configuration. `LatchApp` and `LatchUser`
/// are thin endpoint wrappers around it.
#[derive(Debug, Clone)]
pub struct Client {
	credential: Credential,
	config: LatchConfig,
	client: ReqwestClient,
}

impl Client {
	/// Create a client against the default backend
	pub fn new(
		app_id: impl Into<String>,
		secret_key: impl Into<String>,
	) -> Result<Self, ClientError> {
		Self::with_config(Credential::new(app_id, secret_key), LatchConfig::default())
	}

	/// Create a client with custom configuration
	pub fn with_config(credential: Credential, config: LatchConfig) -> Result<Self, ClientError> {
		config.validate()?;
		if credential.app_id().is_empty() {
			return Err(ConfigError::EmptyAppId.into());
		}
		if credential.secret_key().is_empty() {
			return Err(ConfigError::EmptySecretKey.into());
		}

		let client = ReqwestClient::builder()
			.timeout(config.timeout)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			credential,
			config,
			client,
		})
	}

	pub fn config(&self) -> &LatchConfig {
		&self.config
	}

	pub fn app_id(&self) -> &str {
		self.credential.app_id()
	}

	/// `/api/<version>/<resource>`
	pub fn endpoint(&self, resource: &str) -> String {
		format!("{}/{}", self.config.api_base_path(), resource)
	}

	/// Compute the authentication headers for `request` without sending it
	pub fn sign(&self, request: &ApiRequest) -> Result<SignedHeaders, ClientError> {
		Ok(sign_request(&self.credential, &to_signable(request))?)
	}

	/// Sign and send a request, then decode the Latch envelope
	pub async fn execute(&self, request: &ApiRequest) -> Result<LatchResponse, ClientError> {
		let signed = self.sign(request)?;
		let url = self.config.url_for(&request.path);

		let mut builder = match request.method {
			HttpMethod::Get => self.client.get(&url),
			HttpMethod::Post => self.client.post(&url),
			HttpMethod::Put => self.client.put(&url),
			HttpMethod::Delete => self.client.delete(&url),
		};
		for (name, value) in signed.to_pairs() {
			builder = builder.header(name, value);
		}
		if request.method.has_body() {
			let body = serialize_params(&to_param_map(request));
			builder = builder.header(CONTENT_TYPE, FORM_URLENCODED).body(body);
		}

		debug!(target: "latch_sdk::client", method = %request.method, %url, "Sending request");

		let response = builder
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		let status = response.status();
		if !status.is_success() {
			let error_text = response
				.text()
				.await
				.unwrap_or_else(|_| format!("HTTP {}", status));
			warn!(target: "latch_sdk::client", %status, %url, "Latch request rejected");
			return Err(ClientError::Server(format!("{}: {}", status, error_text)));
		}

		let body = response
			.text()
			.await
			.map_err(|e| ClientError::Network(format!("Failed to read response: {}", e)))?;

		let latch_response = LatchResponse::from_json(&body).map_err(|e| {
			ClientError::InvalidResponse(format!("Failed to parse response: {}", e))
		})?;

		if let Some(error) = &latch_response.error {
			debug!(target: "latch_sdk::client", code = error.code, message = %error.message, "Latch returned an error");
		}

		Ok(latch_response)
	}
}

fn to_param_map(request: &ApiRequest) -> HashMap<String, String> {
	request
		.params
		.iter()
		.map(|(k, v)| (k.clone(), v.clone()))
		.collect()
}

fn to_signable(request: &ApiRequest) -> SignableRequest {
	let signable = SignableRequest::new(request.method, request.path.clone());
	if request.method.has_body() {
		signable.with_params(to_param_map(request))
	} else {
		signable
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::signing::AuthorizationParts;

	#[test]
	fn test_client_creation() {
		let client = Client::new("app1", "secret1").unwrap();
		assert_eq!(client.config().host, "https://latch.elevenpaths.com");
		assert_eq!(client.app_id(), "app1");
		assert_eq!(client.endpoint("status"), "/api/1.0/status");
	}

	#[test]
	fn test_client_rejects_missing_credentials() {
		assert!(matches!(
			Client::new("", "secret1"),
			Err(ClientError::Configuration(ConfigError::EmptyAppId))
		));
		assert!(matches!(
			Client::new("app1", ""),
			Err(ClientError::Configuration(ConfigError::EmptySecretKey))
		));
	}

	#[test]
	fn test_sign_produces_authorization() {
		let client = Client::new("app1", "secret1").unwrap();
		let signed = client.sign(&ApiRequest::get("/api/1.0/status/abc")).unwrap();
		let parts = AuthorizationParts::parse(&signed.authorization).unwrap();
		assert_eq!(parts.method, "11PATHS");
		assert_eq!(parts.app_id, "app1");
	}

	#[test]
	fn test_get_params_are_not_signed() {
		let request = ApiRequest::get("/api/1.0/status/abc").param("ignored", "x");
		assert!(to_signable(&request).params.is_empty());

		let request = ApiRequest::post("/api/1.0/status/abc").param("otp", "123");
		assert_eq!(to_signable(&request).params["otp"], "123");
	}
}
