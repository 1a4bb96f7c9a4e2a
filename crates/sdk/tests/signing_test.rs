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

//! Integration tests for request signing
//!
//! Vectors were computed independently with a reference HMAC-SHA1 implementation.

use std::{collections::HashMap, sync::Arc, thread};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use latch_sdk::signing::{
	AUTHORIZATION_HEADER_NAME, AUTHORIZATION_METHOD, DATE_HEADER_NAME, UTC_STRING_FORMAT,
	string_to_sign,
};
use latch_sdk::{
	AuthorizationParts, Credential, HttpMethod, SignableRequest, SigningError, sign_request,
	sign_request_at,
};

const TIMESTAMP: &str = "2020-01-01 00:00:00";

fn credential() -> Credential {
	Credential::new("app1", "secret1")
}

#[test]
fn test_get_without_headers_or_params() {
	let request = SignableRequest::new(HttpMethod::Get, "/api/1.0/status/abc");
	let signed = sign_request_at(&credential(), &request, TIMESTAMP).unwrap();

	assert_eq!(signed.authorization, "11PATHS app1 tSviPZxBZcar/a7KRNJg41b+Uzc=");
	assert_eq!(signed.date, TIMESTAMP);
}

#[test]
fn test_post_with_headers_and_params() {
	let request = SignableRequest::new(HttpMethod::Post, "/api/1.0/status/abc")
		.with_header("X-11paths-B", "2")
		.with_header("X-11paths-A", "1\nx")
		.with_param("b", "2")
		.with_param("a", "1 1");

	assert_eq!(
		string_to_sign(&request, TIMESTAMP).unwrap(),
		"POST\n2020-01-01 00:00:00\nx-11paths-a:1 x x-11paths-b:2\n/api/1.0/status/abc\na=1%201&b=2"
	);

	let signed = sign_request_at(&credential(), &request, TIMESTAMP).unwrap();
	assert_eq!(signed.authorization, "11PATHS app1 +p9sDCbLXtjzeKajv2T11XjdKLA=");
}

#[test]
fn test_put_create_operation_vector() {
	let request = SignableRequest::new(HttpMethod::Put, "/api/1.0/operation").with_params([
		("parentId", "app1"),
		("name", "Login"),
		("two_factor", "OPT_IN"),
		("lock_on_request", "DISABLED"),
	]);

	let signed = sign_request_at(&credential(), &request, TIMESTAMP).unwrap();
	assert_eq!(signed.authorization, "11PATHS app1 tBYBDlXrXVk1aHazeC1kL5bD4rM=");
}

#[test]
fn test_deterministic() {
	let request = SignableRequest::new(HttpMethod::Post, "/api/1.0/lock/abc")
		.with_header("X-11paths-Body-Hash", "abc")
		.with_param("otp", "123");

	let first = sign_request_at(&credential(), &request, TIMESTAMP).unwrap();
	for _ in 0..10 {
		assert_eq!(sign_request_at(&credential(), &request, TIMESTAMP).unwrap(), first);
	}
}

#[test]
fn test_insertion_order_does_not_matter() {
	let keys = ["X-11paths-C", "X-11paths-A", "X-11paths-B", "x-11paths-D"];
	let params = [("z", "1"), ("a", "2"), ("m", "3 3"), ("B", "4")];

	let forward = keys
		.iter()
		.fold(SignableRequest::new(HttpMethod::Put, "/api/1.0/operation"), |r, k| {
			r.with_header(*k, "v")
		})
		.with_params(params);

	let backward = keys
		.iter()
		.rev()
		.fold(SignableRequest::new(HttpMethod::Put, "/api/1.0/operation"), |r, k| {
			r.with_header(*k, "v")
		})
		.with_params(params.iter().rev().copied());

	assert_eq!(
		string_to_sign(&forward, TIMESTAMP).unwrap(),
		string_to_sign(&backward, TIMESTAMP).unwrap()
	);
}

#[test]
fn test_foreign_header_rejected_in_any_case() {
	for key in ["Content-Type", "x-other-header", "X-11path-Date", "11paths-x"] {
		let request =
			SignableRequest::new(HttpMethod::Get, "/api/1.0/status/abc").with_header(key, "v");
		assert_eq!(
			sign_request_at(&credential(), &request, TIMESTAMP),
			Err(SigningError::ForeignHeader(key.to_string()))
		);
	}

	for key in ["X-11PATHS-Date2", "x-11paths-a", "X-11Paths-Body-Hash"] {
		let request =
			SignableRequest::new(HttpMethod::Get, "/api/1.0/status/abc").with_header(key, "v");
		assert!(sign_request_at(&credential(), &request, TIMESTAMP).is_ok());
	}
}

#[test]
fn test_header_newlines_are_defused() {
	let request = SignableRequest::new(HttpMethod::Get, "/api/1.0/status/abc")
		.with_header("X-11paths-Note", "line1\nline2\n");
	let s = string_to_sign(&request, TIMESTAMP).unwrap();

	let header_line = s.lines().nth(2).unwrap();
	assert_eq!(header_line, "x-11paths-note:line1 line2");
	// method, date, headers, path
	assert_eq!(s.matches('\n').count(), 3);
}

#[test]
fn test_authorization_round_trip() {
	let request = SignableRequest::new(HttpMethod::Delete, "/api/1.0/operation/op1");
	let signed = sign_request_at(&credential(), &request, TIMESTAMP).unwrap();

	assert_eq!(signed.authorization.split(' ').count(), 3);
	let parts = AuthorizationParts::parse(&signed.authorization).unwrap();
	assert_eq!(parts.method, AUTHORIZATION_METHOD);
	assert_eq!(parts.app_id, "app1");
	assert_eq!(STANDARD.decode(parts.signature).unwrap().len(), 20);
}

#[test]
fn test_header_pairs() {
	let request = SignableRequest::new(HttpMethod::Get, "/api/1.0/status/abc");
	let signed = sign_request_at(&credential(), &request, TIMESTAMP).unwrap();

	let pairs: HashMap<_, _> = signed.to_pairs().into_iter().collect();
	assert_eq!(pairs.len(), 2);
	assert_eq!(pairs[AUTHORIZATION_HEADER_NAME], signed.authorization);
	assert_eq!(pairs[DATE_HEADER_NAME], TIMESTAMP);
}

#[test]
fn test_sign_request_stamps_current_time() {
	let request = SignableRequest::new(HttpMethod::Get, "/api/1.0/status/abc");
	let before = chrono::Utc::now().naive_utc();
	let signed = sign_request(&credential(), &request).unwrap();
	let after = chrono::Utc::now().naive_utc();

	let stamped = chrono::NaiveDateTime::parse_from_str(&signed.date, UTC_STRING_FORMAT).unwrap();
	assert!(stamped >= before - chrono::Duration::seconds(1));
	assert!(stamped <= after);

	let resigned = sign_request_at(&credential(), &request, &signed.date).unwrap();
	assert_eq!(resigned, signed);
}

#[test]
fn test_concurrent_signing() {
	let credential = Arc::new(credential());
	let handles: Vec<_> = (0..8)
		.map(|_| {
			let credential = Arc::clone(&credential);
			thread::spawn(move || {
				let request = SignableRequest::new(HttpMethod::Get, "/api/1.0/status/abc");
				sign_request_at(&credential, &request, TIMESTAMP).unwrap()
			})
		})
		.collect();

	for handle in handles {
		assert_eq!(
			handle.join().unwrap().authorization,
			"11PATHS app1 tSviPZxBZcar/a7KRNJg41b+Uzc="
		);
	}
}
