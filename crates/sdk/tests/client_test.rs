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

//! Client tests against a one-shot loopback HTTP server

use std::collections::HashMap;

use latch_sdk::signing::string_to_sign;
use latch_sdk::{
	ApiError, ApplicationParams, AuthorizationParts, Client, ClientError, Credential,
	FeatureMode, HttpMethod, LatchApp, LatchConfig, LatchUser, SignableRequest, StatusOptions,
	sign_request_at,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Request as seen by the server
#[derive(Debug)]
struct CapturedRequest {
	method: String,
	path: String,
	headers: HashMap<String, String>,
	body: String,
}

/// Serve exactly one request with the given status and body
async fn serve_once(
	status: u16,
	response_body: &'static str,
) -> (String, JoinHandle<CapturedRequest>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let host = format!("http://{}", listener.local_addr().unwrap());

	let handle = tokio::spawn(async move {
		let (mut socket, _) = listener.accept().await.unwrap();

		let mut buf = Vec::new();
		let mut chunk = [0u8; 4096];
		let header_end = loop {
			let n = socket.read(&mut chunk).await.unwrap();
			assert!(n > 0, "connection closed before headers were complete");
			buf.extend_from_slice(&chunk[..n]);
			if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
				break pos;
			}
		};

		let head = String::from_utf8(buf[..header_end].to_vec()).unwrap();
		let mut lines = head.split("\r\n");
		let mut request_line = lines.next().unwrap().split(' ');
		let method = request_line.next().unwrap().to_string();
		let path = request_line.next().unwrap().to_string();
		let headers: HashMap<String, String> = lines
			.filter_map(|line| line.split_once(':'))
			.map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
			.collect();

		let content_length: usize = headers
			.get("content-length")
			.map(|v| v.parse().unwrap())
			.unwrap_or(0);
		let mut body = buf[header_end + 4..].to_vec();
		while body.len() < content_length {
			let n = socket.read(&mut chunk).await.unwrap();
			assert!(n > 0, "connection closed before body was complete");
			body.extend_from_slice(&chunk[..n]);
		}

		let response = format!(
			"HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
			status,
			response_body.len(),
			response_body
		);
		socket.write_all(response.as_bytes()).await.unwrap();
		socket.shutdown().await.ok();

		CapturedRequest {
			method,
			path,
			headers,
			body: String::from_utf8(body).unwrap(),
		}
	});

	(host, handle)
}

fn client_for(host: &str) -> Client {
	Client::with_config(
		Credential::new("app1", "secret1"),
		LatchConfig::new().with_host(host),
	)
	.unwrap()
}

/// Recompute the signature the way the server does
fn assert_signed(captured: &CapturedRequest, params: &[(&str, &str)]) {
	let authorization = &captured.headers["authorization"];
	let date = &captured.headers["x-11paths-date"];
	let parts = AuthorizationParts::parse(authorization).unwrap();
	assert_eq!(parts.method, "11PATHS");
	assert_eq!(parts.app_id, "app1");

	let method = match captured.method.as_str() {
		"GET" => HttpMethod::Get,
		"POST" => HttpMethod::Post,
		"PUT" => HttpMethod::Put,
		"DELETE" => HttpMethod::Delete,
		other => panic!("unexpected method {other}"),
	};
	let request = SignableRequest::new(method, captured.path.clone())
		.with_params(params.iter().copied());
	let expected = sign_request_at(&Credential::new("app1", "secret1"), &request, date).unwrap();
	assert_eq!(&expected.authorization, authorization);
	assert!(string_to_sign(&request, date).is_ok());
}

#[tokio::test]
async fn test_status_get_is_signed() {
	let (host, server) = serve_once(200, r#"{"data":{"operations":{"app1":{"status":"on"}}}}"#).await;
	let app = LatchApp::new(client_for(&host));

	let response = app
		.status("acc 1", &StatusOptions::default().silent())
		.await
		.unwrap();
	assert!(response.error.is_none());
	assert!(response.get("operations").is_some());

	let captured = server.await.unwrap();
	assert_eq!(captured.method, "GET");
	assert_eq!(captured.path, "/api/1.0/status/acc%201/silent");
	assert!(captured.body.is_empty());
	assert_signed(&captured, &[]);
}

#[tokio::test]
async fn test_post_sends_form_body() {
	let (host, server) = serve_once(200, "{}").await;
	let app = LatchApp::new(client_for(&host));

	app.status_with_otp("acc1", Some("op1"), false, Some("123 456"), Some("Your code"))
		.await
		.unwrap();

	let captured = server.await.unwrap();
	assert_eq!(captured.method, "POST");
	assert_eq!(captured.path, "/api/1.0/status/acc1/op/op1");
	assert_eq!(
		captured.headers["content-type"],
		"application/x-www-form-urlencoded"
	);
	assert_eq!(captured.body, "msg=Your%20code&otp=123%20456");
	assert_signed(&captured, &[("otp", "123 456"), ("msg", "Your code")]);
}

#[tokio::test]
async fn test_put_create_application() {
	let (host, server) = serve_once(200, r#"{"data":{"applicationId":"new"}}"#).await;
	let user = LatchUser::new(client_for(&host));

	let params = ApplicationParams {
		name: "App".to_string(),
		two_factor: FeatureMode::Mandatory,
		lock_on_request: FeatureMode::Disabled,
		contact_phone: String::new(),
		contact_email: "a@b.c".to_string(),
	};
	let response = user.create_application(&params).await.unwrap();
	assert_eq!(
		response.get("applicationId").and_then(|v| v.as_str()),
		Some("new")
	);

	let captured = server.await.unwrap();
	assert_eq!(captured.method, "PUT");
	assert_eq!(captured.path, "/api/1.0/application");
	assert_eq!(
		captured.body,
		"contactEmail=a%40b.c&contactPhone=&lock_on_request=DISABLED&name=App&two_factor=MANDATORY"
	);
	assert_signed(
		&captured,
		&[
			("name", "App"),
			("two_factor", "MANDATORY"),
			("lock_on_request", "DISABLED"),
			("contactPhone", ""),
			("contactEmail", "a@b.c"),
		],
	);
}

#[tokio::test]
async fn test_delete_operation() {
	let (host, server) = serve_once(200, "{}").await;
	let app = LatchApp::new(client_for(&host));

	app.remove_operation("op1").await.unwrap();

	let captured = server.await.unwrap();
	assert_eq!(captured.method, "DELETE");
	assert_eq!(captured.path, "/api/1.0/operation/op1");
	assert_signed(&captured, &[]);
}

#[tokio::test]
async fn test_api_error_is_surfaced() {
	let (host, server) =
		serve_once(200, r#"{"error":{"code":201,"message":"Account not paired"}}"#).await;
	let app = LatchApp::new(client_for(&host));

	let response = app.unpair("acc1").await.unwrap();
	assert_eq!(response.error, Some(ApiError::new(201, "Account not paired")));
	server.await.unwrap();
}

#[tokio::test]
async fn test_http_error_is_server_error() {
	let (host, server) = serve_once(401, r#"{"error":"unauthorized"}"#).await;
	let app = LatchApp::new(client_for(&host));

	let result = app.pair("token").await;
	assert!(matches!(result, Err(ClientError::Server(msg)) if msg.starts_with("401")));
	server.await.unwrap();
}

#[tokio::test]
async fn test_invalid_json_is_invalid_response() {
	let (host, server) = serve_once(200, "not json").await;
	let user = LatchUser::new(client_for(&host));

	let result = user.get_subscription().await;
	assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
	server.await.unwrap();
}

#[tokio::test]
async fn test_network_error() {
	// Bind then drop to get a port with nothing listening
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let host = format!("http://{}", listener.local_addr().unwrap());
	drop(listener);

	let app = LatchApp::new(client_for(&host));
	let result = app.get_operations(None).await;
	assert!(matches!(result, Err(ClientError::Network(_))));
}
