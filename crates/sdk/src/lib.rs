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

//! Latch SDK - Client library for the Latch authorization service
//!
//! This crate provides the request signer required by every Latch API call,
//! request builders for the application and user APIs, and an async HTTP
//! client that signs and sends them.
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background threads
//! - No runtime initialization
//! - No environment or configuration loading
//!
//! ```no_run
//! # async fn run() -> Result<(), latch_sdk::ClientError> {
//! use latch_sdk::{Client, LatchApp, StatusOptions};
//!
//! let app = LatchApp::new(Client::new("app-id", "secret")?);
//! let response = app.status("account-id", &StatusOptions::default()).await?;
//! if let Some(error) = response.error {
//! 	eprintln!("{error}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod signing;
pub mod types;
pub mod user;

pub use app::{AppEndpoints, LatchApp, StatusOptions};
pub use client::{Client, ClientError};
pub use config::{ConfigError, LatchConfig};
pub use signing::{
	AuthorizationParts, Credential, HttpMethod, SignableRequest, SignedHeaders, SigningError,
	sign_request, sign_request_at,
};
pub use types::*;
pub use user::{ApplicationParams, LatchUser, UserEndpoints};
