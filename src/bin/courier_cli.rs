//! # courier-cli
//!
//! Command-line front end for the Courier gateway.
//!
//! - `courier-cli chat` - run chat requests (inline or from a job file)
//! - `courier-cli stream FILE` - parse a saved event-stream transcript
//! - `courier-cli models` - list models for a provider
//! - `courier-cli lora --job FILE` - generate LoRA training configs
//! - `courier-cli manage load|unload` - load or unload a model
//! - `courier-cli check` - check the API key
//!
//! Results are printed as pretty JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use courier_gateway::batch::{BatchExecutor, BatchExecutorConfig, BatchStrategy};
use courier_gateway::client::{ManageAction, Quantization};
use courier_gateway::pipeline::parse_stream;
use courier_gateway::transport::{Credentials, HttpTransport};
use courier_gateway::{ChatParams, CourierClient, LoraJob, Provider};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Courier gateway CLI
#[derive(Parser)]
#[command(name = "courier-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "COURIER_BASE_URL", default_value = courier_gateway::transport::credentials::DEFAULT_BASE_URL)]
    base_url: String,

    /// API key
    #[arg(long, global = true, env = "COURIER_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Keep going after a failed item and emit `{"error": ...}` in its place
    #[arg(long, global = true)]
    continue_on_fail: bool,

    /// Items processed at once for batch commands
    #[arg(long, global = true, default_value_t = 1)]
    concurrency: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "courier_gateway=info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run chat requests
    Chat {
        /// YAML or JSON file with one request or a list of requests
        #[arg(long, value_name = "FILE", conflicts_with_all = ["model", "prompt"])]
        job: Option<PathBuf>,

        /// Model selection: listing JSON or a bare name
        #[arg(long, required_unless_present = "job")]
        model: Option<String>,

        #[arg(long, required_unless_present = "job")]
        prompt: Option<String>,

        #[arg(long, default_value = "courier")]
        provider: Provider,

        #[arg(long)]
        system_prompt: Option<String>,

        #[arg(long, default_value_t = courier_gateway::client::DEFAULT_TEMPERATURE)]
        temperature: f64,

        /// Response schema, loose or strict, as JSON
        #[arg(long)]
        schema: Option<String>,

        #[arg(long)]
        stream: bool,
    },

    /// Parse a saved event-stream transcript
    Stream {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List available models
    Models {
        #[arg(long, default_value = "courier")]
        provider: Provider,
    },

    /// Generate LoRA training configs
    Lora {
        /// YAML or JSON file with one job or a list of jobs
        #[arg(long, value_name = "FILE")]
        job: PathBuf,
    },

    /// Load or unload a model
    Manage {
        #[command(subcommand)]
        action: ManageCommand,
    },

    /// Check that the API key is valid
    Check,
}

#[derive(Subcommand)]
enum ManageCommand {
    Load {
        #[arg(long)]
        model_id: String,
        #[arg(long, default_value = "q4_k_m")]
        quantization: Quantization,
    },
    Unload {
        #[arg(long)]
        model_id: String,
    },
}

/// A job file holds either one entry or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    run(cli).await
}

/// The client is only built for commands that talk to the backend.
async fn run(cli: Cli) -> Result<()> {
    let Cli {
        base_url,
        api_key,
        continue_on_fail,
        concurrency,
        command,
        ..
    } = cli;

    let executor = BatchExecutor::with_config(
        BatchExecutorConfig::new()
            .with_continue_on_error(continue_on_fail)
            .with_strategy(if concurrency > 1 {
                BatchStrategy::Concurrent {
                    max_concurrency: concurrency,
                }
            } else {
                BatchStrategy::Sequential
            }),
    );

    match command {
        Commands::Stream { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            print_json(&parse_stream(&raw))
        }
        Commands::Chat {
            job,
            model,
            prompt,
            provider,
            system_prompt,
            temperature,
            schema,
            stream,
        } => {
            let params = match job {
                Some(path) => load_jobs::<ChatParams>(&path)?,
                None => {
                    let mut p = ChatParams::text(model.unwrap_or_default(), prompt.unwrap_or_default())
                        .provider(provider)
                        .temperature(temperature)
                        .stream(stream);
                    if let Some(sp) = system_prompt {
                        p = p.system_prompt(sp);
                    }
                    if let Some(s) = schema {
                        p = p.json_schema(serde_json::Value::String(s));
                    }
                    vec![p]
                }
            };
            let client = connect(&base_url, &api_key)?;
            let result = executor
                .execute(params, |p| {
                    let client = client.clone();
                    async move { client.chat(&p).await }
                })
                .await?;
            print_json(&result.outcomes)
        }
        Commands::Lora { job } => {
            let jobs = load_jobs::<LoraJob>(&job)?;
            let client = connect(&base_url, &api_key)?;
            let result = executor
                .execute(jobs, |j| {
                    let client = client.clone();
                    async move { client.generate_lora_config(&j).await }
                })
                .await?;
            print_json(&result.outcomes)
        }
        Commands::Models { provider } => {
            let client = connect(&base_url, &api_key)?;
            print_json(&client.list_models(provider).await?)
        }
        Commands::Manage { action } => {
            let action = match action {
                ManageCommand::Load {
                    model_id,
                    quantization,
                } => ManageAction::Load {
                    model_id,
                    quantization,
                },
                ManageCommand::Unload { model_id } => ManageAction::Unload { model_id },
            };
            print_json(&connect(&base_url, &api_key)?.manage_model(&action).await?)
        }
        Commands::Check => {
            let client = connect(&base_url, &api_key)?;
            print_json(&client.check_credentials().await?)
        }
    }
}

fn connect(base_url: &str, api_key: &str) -> Result<CourierClient> {
    let credentials = Credentials::new(base_url, api_key)?;
    Ok(CourierClient::builder()
        .credentials(credentials)
        .transport(Arc::new(HttpTransport::from_env()?))
        .build()?)
}

fn load_jobs<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    let jobs: OneOrMany<T> = serde_yaml::from_str(&raw)
        .with_context(|| format!("Invalid job file {}", path.display()))?;
    Ok(match jobs {
        OneOrMany::Many(v) => v,
        OneOrMany::One(j) => vec![j],
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
