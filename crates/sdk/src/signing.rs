// Copyright 2025 chenjjiaa
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

//! Request signing for the Latch API
//!
//! Every call to the API carries two headers computed here:
//!
//! - `Authorization: 11PATHS <app_id> <signature>`
//! - `X-11Paths-Date: <yyyy-MM-dd HH:mm:ss>` (UTC, no zone marker)
//!
//! The signature is `base64(HMAC-SHA1(secret, string_to_sign))` where the
//! string to sign is the newline-joined sequence:
//!
//! ```text
//! METHOD
//! TIMESTAMP
//! serialized X-11paths- headers (may be empty)
//! path and query
//! serialized body params (only when non-empty)
//! ```
//!
//! The server recomputes the same string, so every byte here is part of the
//! wire contract. Empty header and query lines are kept as empty lines.

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use tracing::debug;

type HmacSha1 = Hmac<Sha1>;

/// Name of the header carrying the signature
pub const AUTHORIZATION_HEADER_NAME: &str = "Authorization";
/// Name of the header carrying the signed timestamp
pub const DATE_HEADER_NAME: &str = "X-11Paths-Date";
/// Scheme token placed first in the `Authorization` value
pub const AUTHORIZATION_METHOD: &str = "11PATHS";
/// Namespace prefix of the headers that take part in the signature
pub const X_11PATHS_HEADER_PREFIX: &str = "X-11paths-";
/// `chrono` rendering of `yyyy-MM-dd HH:mm:ss`
pub const UTC_STRING_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const AUTHORIZATION_HEADER_FIELD_SEPARATOR: char = ' ';
const X_11PATHS_HEADER_SEPARATOR: char = ':';
const PARAM_SEPARATOR: char = '&';
const PARAM_VALUE_SEPARATOR: char = '=';

/// Characters left untouched by [`url_encode`]: ASCII alphanumerics plus `-_.!*()`.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'*')
	.remove(b'(')
	.remove(b')');

/// Error types for signing operations
///
/// All of these are caller mistakes. They are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
	#[error("Secret key can not be empty")]
	EmptySecretKey,
	#[error("String to sign can not be empty")]
	EmptyStringToSign,
	#[error("Query string can not be empty")]
	EmptyQueryString,
	#[error("Timestamp can not be empty")]
	EmptyTimestamp,
	#[error("Only specific X-11paths- headers may be signed, got: {0}")]
	ForeignHeader(String),
	#[error("Header {0} supplied more than once")]
	DuplicateHeader(String),
}

/// HTTP methods accepted by the Latch API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	Get,
	Post,
	Put,
	Delete,
}

impl HttpMethod {
	pub fn as_str(&self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Delete => "DELETE",
		}
	}

	/// Whether the request carries a form-encoded body
	pub fn has_body(&self) -> bool {
		matches!(self, HttpMethod::Post | HttpMethod::Put)
	}
}

impl fmt::Display for HttpMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Application credentials issued by Latch
///
/// The secret key is only ever used as HMAC key material. It is not
/// printed by `Debug` and never leaves the process.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
	app_id: String,
	secret_key: String,
}

impl Credential {
	pub fn new(app_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
		Self {
			app_id: app_id.into(),
			secret_key: secret_key.into(),
		}
	}

	pub fn app_id(&self) -> &str {
		&self.app_id
	}

	pub(crate) fn secret_key(&self) -> &str {
		&self.secret_key
	}
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credential")
			.field("app_id", &self.app_id)
			.field("secret_key", &"<redacted>")
			.finish()
	}
}

/// A request in the shape the signer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableRequest {
	/// HTTP method
	pub method: HttpMethod,
	/// Url-encoded path from the first `/`, including any query
	pub query_string: String,
	/// `X-11paths-` headers to sign, excluding the date header
	pub headers: HashMap<String, String>,
	/// Url-decoded form body parameters, only for POST and PUT
	pub params: HashMap<String, String>,
}

impl SignableRequest {
	pub fn new(method: HttpMethod, query_string: impl Into<String>) -> Self {
		Self {
			method,
			query_string: query_string.into(),
			headers: HashMap::new(),
			params: HashMap::new(),
		}
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());
		self
	}

	pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.headers
			.extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());
		self
	}

	pub fn with_params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.params
			.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}
}

/// The two headers to attach to an outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
	/// Value of the `Authorization` header
	pub authorization: String,
	/// Value of the `X-11Paths-Date` header
	pub date: String,
}

impl SignedHeaders {
	/// Header name/value pairs, ready for an HTTP client
	pub fn to_pairs(&self) -> [(&'static str, &str); 2] {
		[
			(AUTHORIZATION_HEADER_NAME, self.authorization.as_str()),
			(DATE_HEADER_NAME, self.date.as_str()),
		]
	}
}

/// The three space-separated fields of an `Authorization` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationParts<'a> {
	pub method: &'a str,
	pub app_id: &'a str,
	pub signature: &'a str,
}

impl<'a> AuthorizationParts<'a> {
	/// Split an `Authorization` value back into its fields
	///
	/// Returns `None` unless there are exactly three fields.
	pub fn parse(header: &'a str) -> Option<Self> {
		let mut parts = header.split(AUTHORIZATION_HEADER_FIELD_SEPARATOR);
		let method = parts.next()?;
		let app_id = parts.next()?;
		let signature = parts.next()?;
		if parts.next().is_some() {
			return None;
		}
		Some(Self {
			method,
			app_id,
			signature,
		})
	}
}

/// Current UTC time in the `X-11Paths-Date` format
pub fn current_utc() -> String {
	chrono::Utc::now().format(UTC_STRING_FORMAT).to_string()
}

/// Encode a value for a form body or a URL path segment, UTF-8 percent-encoded
pub fn url_encode(value: &str) -> String {
	utf8_percent_encode(value, URL_ENCODE_SET).to_string()
}

/// Serialize the `X-11paths-` headers for signing
///
/// Keys are lower-cased and sorted, newlines in values become spaces,
/// and pairs are rendered `key:value` separated by single spaces.
pub fn serialize_headers(headers: &HashMap<String, String>) -> Result<String, SigningError> {
	if headers.is_empty() {
		return Ok(String::new());
	}

	let mut entries = Vec::with_capacity(headers.len());
	for (key, value) in headers {
		if !has_prefix_ignore_case(key, X_11PATHS_HEADER_PREFIX) {
			return Err(SigningError::ForeignHeader(key.clone()));
		}
		entries.push((key.to_lowercase(), value.replace('\n', " ")));
	}
	entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

	if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
		return Err(SigningError::DuplicateHeader(pair[0].0.clone()));
	}

	let serialized = entries
		.iter()
		.map(|(key, value)| format!("{key}{X_11PATHS_HEADER_SEPARATOR}{value}"))
		.collect::<Vec<_>>()
		.join(&AUTHORIZATION_HEADER_FIELD_SEPARATOR.to_string());

	Ok(serialized
		.trim_matches(AUTHORIZATION_HEADER_FIELD_SEPARATOR)
		.to_string())
}

/// Serialize form parameters for signing and for the request body
///
/// Sorted by raw key; both key and value are url-encoded.
pub fn serialize_params(params: &HashMap<String, String>) -> String {
	if params.is_empty() {
		return String::new();
	}

	let mut entries: Vec<_> = params.iter().collect();
	entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

	let serialized = entries
		.iter()
		.map(|(key, value)| {
			format!(
				"{}{PARAM_VALUE_SEPARATOR}{}",
				url_encode(key),
				url_encode(value)
			)
		})
		.collect::<Vec<_>>()
		.join(&PARAM_SEPARATOR.to_string());

	serialized.trim_matches(PARAM_SEPARATOR).to_string()
}

/// Build the canonical string that gets signed
pub fn string_to_sign(request: &SignableRequest, timestamp: &str) -> Result<String, SigningError> {
	if request.query_string.trim().is_empty() {
		return Err(SigningError::EmptyQueryString);
	}
	if timestamp.is_empty() {
		return Err(SigningError::EmptyTimestamp);
	}

	let mut string_to_sign = format!(
		"{}\n{}\n{}\n{}",
		request.method.as_str().to_uppercase().trim(),
		timestamp,
		serialize_headers(&request.headers)?,
		request.query_string.trim(),
	);

	let serialized_params = serialize_params(&request.params);
	if !serialized_params.is_empty() {
		string_to_sign.push('\n');
		string_to_sign.push_str(&serialized_params);
	}

	Ok(string_to_sign)
}

/// Sign `data` with `secret_key`
///
/// Returns the base64 of the HMAC-SHA1 digest. Key and message are converted
/// to ASCII first, so any non-ASCII character becomes `?`.
pub fn sign_data(secret_key: &str, data: &str) -> Result<String, SigningError> {
	if data.is_empty() {
		return Err(SigningError::EmptyStringToSign);
	}
	if secret_key.is_empty() {
		return Err(SigningError::EmptySecretKey);
	}

	// HMAC accepts keys of any length, so this cannot fail
	let mut mac = HmacSha1::new_from_slice(&to_ascii_bytes(secret_key))
		.map_err(|_| SigningError::EmptySecretKey)?;
	mac.update(&to_ascii_bytes(data));

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Sign a request stamped with the current UTC time
pub fn sign_request(
	credential: &Credential,
	request: &SignableRequest,
) -> Result<SignedHeaders, SigningError> {
	sign_request_at(credential, request, &current_utc())
}

/// Sign a request with an explicit `X-11Paths-Date` timestamp
pub fn sign_request_at(
	credential: &Credential,
	request: &SignableRequest,
	timestamp: &str,
) -> Result<SignedHeaders, SigningError> {
	let string_to_sign = string_to_sign(request, timestamp)?;
	let signature = sign_data(credential.secret_key(), &string_to_sign)?;

	debug!(
		target: "latch_sdk::signing",
		method = %request.method,
		path = %request.query_string.trim(),
		timestamp,
		app_id = credential.app_id(),
		"Signed request"
	);

	Ok(SignedHeaders {
		authorization: format!(
			"{AUTHORIZATION_METHOD}{sep}{app_id}{sep}{signature}",
			sep = AUTHORIZATION_HEADER_FIELD_SEPARATOR,
			app_id = credential.app_id(),
		),
		date: timestamp.to_string(),
	})
}

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
	value
		.as_bytes()
		.get(..prefix.len())
		.is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

/// Lossy ASCII conversion: one `?` per non-ASCII character
///
/// A character outside the BMP is a single replacement, not one per
/// UTF-16 code unit.
fn to_ascii_bytes(value: &str) -> Vec<u8> {
	value
		.chars()
		.map(|c| if c.is_ascii() { c as u8 } else { b'?' })
		.collect()
}
