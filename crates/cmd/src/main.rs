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

//! Latch command line client
//!
//! Signs requests offline (`latch sign`) and calls the application and user
//! APIs. Credentials come from `LATCH_APP_ID` / `LATCH_SECRET_KEY`.

mod config;
mod logging;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use latch_sdk::{
	Client, HttpMethod, LatchApp, LatchResponse, LatchUser, SignableRequest, StatusOptions,
	sign_request, sign_request_at,
};
use tracing::info;

use crate::{config::CliConfig, logging::init_logging};

#[derive(Parser)]
#[command(name = "latch", about = "Latch API client", version)]
struct Args {
	/// Backend URL, overrides LATCH_HOST
	#[arg(long, global = true)]
	host: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
	Get,
	Post,
	Put,
	Delete,
}

impl From<Method> for HttpMethod {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => HttpMethod::Get,
			Method::Post => HttpMethod::Post,
			Method::Put => HttpMethod::Put,
			Method::Delete => HttpMethod::Delete,
		}
	}
}

#[derive(Subcommand)]
enum Command {
	/// Print the authentication headers for a request without sending it
	Sign {
		#[arg(long, value_enum, default_value = "get")]
		method: Method,
		/// Path and query, e.g. /api/1.0/status/<accountId>
		path: String,
		/// X-11paths- header as NAME=VALUE (repeatable)
		#[arg(long = "header", value_parser = parse_key_value)]
		headers: Vec<(String, String)>,
		/// Form parameter as NAME=VALUE (repeatable)
		#[arg(long = "param", value_parser = parse_key_value)]
		params: Vec<(String, String)>,
		/// Fixed timestamp (yyyy-MM-dd HH:mm:ss) instead of now
		#[arg(long)]
		timestamp: Option<String>,
	},
	#[command(flatten)]
	Api(ApiCommand),
}

#[derive(Subcommand)]
enum ApiCommand {
	/// Pair an account with a token from the mobile app
	Pair { token: String },
	/// Pair an account by id (test backend only)
	PairWithId { id: String },
	/// Check the latch status of an account or operation
	Status {
		account_id: String,
		#[arg(long)]
		operation: Option<String>,
		#[arg(long)]
		silent: bool,
		#[arg(long)]
		no_otp: bool,
	},
	/// Unpair an account
	Unpair { account_id: String },
	/// Lock an account or one of its operations
	Lock {
		account_id: String,
		#[arg(long)]
		operation: Option<String>,
	},
	/// Unlock an account or one of its operations
	Unlock {
		account_id: String,
		#[arg(long)]
		operation: Option<String>,
	},
	/// Show account history, optionally between two epoch-millisecond instants
	History {
		account_id: String,
		#[arg(long)]
		from: Option<i64>,
		#[arg(long)]
		to: Option<i64>,
	},
	/// List operations, optionally under a parent operation
	Operations {
		#[arg(long)]
		parent: Option<String>,
	},
	/// Show the user subscription
	Subscription,
	/// List the user's applications
	Applications,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
	raw.split_once('=')
		.map(|(k, v)| (k.to_string(), v.to_string()))
		.ok_or_else(|| format!("expected NAME=VALUE, got {raw}"))
}

#[tokio::main]
async fn main() -> Result<()> {
	init_logging()?;

	let args = Args::parse();
	let config = CliConfig::from_env(args.host.as_deref())?;

	match args.command {
		Command::Sign {
			method,
			path,
			headers,
			params,
			timestamp,
		} => sign(&config, method, path, headers, params, timestamp),
		Command::Api(command) => call_api(config, command).await,
	}
}

fn sign(
	config: &CliConfig,
	method: Method,
	path: String,
	headers: Vec<(String, String)>,
	params: Vec<(String, String)>,
	timestamp: Option<String>,
) -> Result<()> {
	let request = SignableRequest::new(method.into(), path)
		.with_headers(headers)
		.with_params(params);
	let signed = match timestamp {
		Some(timestamp) => sign_request_at(&config.credential, &request, &timestamp),
		None => sign_request(&config.credential, &request),
	}
	.context("Failed to sign request")?;

	for (name, value) in signed.to_pairs() {
		println!("{name}: {value}");
	}
	Ok(())
}

async fn call_api(config: CliConfig, command: ApiCommand) -> Result<()> {
	let client = Client::with_config(config.credential, config.latch)
		.context("Failed to create Latch client")?;
	info!(target: "latch", host = %client.config().host, "Calling Latch API");

	let app = LatchApp::new(client.clone());
	let user = LatchUser::new(client);

	let response = match command {
		ApiCommand::Pair { token } => app.pair(&token).await,
		ApiCommand::PairWithId { id } => app.pair_with_id(&id).await,
		ApiCommand::Status {
			account_id,
			operation,
			silent,
			no_otp,
		} => {
			let options = StatusOptions {
				operation_id: operation,
				silent,
				no_otp,
			};
			app.status(&account_id, &options).await
		}
		ApiCommand::Unpair { account_id } => app.unpair(&account_id).await,
		ApiCommand::Lock {
			account_id,
			operation,
		} => app.lock(&account_id, operation.as_deref()).await,
		ApiCommand::Unlock {
			account_id,
			operation,
		} => app.unlock(&account_id, operation.as_deref()).await,
		ApiCommand::History {
			account_id,
			from,
			to,
		} => {
			if from.is_none() && to.is_none() {
				app.history(&account_id).await
			} else {
				app.history_between(&account_id, from, to).await
			}
		}
		ApiCommand::Operations { parent } => app.get_operations(parent.as_deref()).await,
		ApiCommand::Subscription => user.get_subscription().await,
		ApiCommand::Applications => user.get_applications().await,
	}
	.context("Latch request failed")?;

	print_response(&response)
}

fn print_response(response: &LatchResponse) -> Result<()> {
	if let Some(data) = &response.data {
		println!("{}", serde_json::to_string_pretty(data)?);
	}
	match &response.error {
		Some(error) => Err(anyhow!("Latch error {}", error)),
		None => Ok(()),
	}
}
