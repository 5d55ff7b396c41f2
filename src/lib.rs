//! # courier-gateway
//!
//! Gateway adapter for Courier inference backends.
//!
//! A caller issues one abstract request (a chat, or a LoRA fine-tuning config)
//! and gets back a normalized record, whichever backend dialect served it.
//!
//! ## Overview
//!
//! - **Dual provider**: the native Courier API and OpenAI-compatible servers,
//!   selected per request through [`drivers::Provider`]
//! - **Streaming**: event-stream chunks are accumulated into one
//!   [`NormalizedResult`], skipping malformed chunks
//! - **LoRA configs**: remote base, built-in defaults and overrides are merged
//!   and rendered to the trainer's YAML document
//! - **Batches**: per-item failure isolation through [`batch::BatchExecutor`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier_gateway::{ChatParams, CourierClient};
//!
//! #[tokio::main]
//! async fn main() -> courier_gateway::Result<()> {
//!     let client = CourierClient::from_env()?;
//!     let params = ChatParams::text(r#"{"name":"llama-3-8b","id":"m-1"}"#, "Hello!");
//!     let result = client.chat(&params).await?;
//!     println!("{}", result.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`CourierClient`] and the message builder |
//! | [`drivers`] | per-provider request builders and response normalizers |
//! | [`pipeline`] | streamed response parsing |
//! | [`structured`] | response schema normalization |
//! | [`lora`] | LoRA config overlay and rendering |
//! | [`transport`] | the send capability, credentials, reqwest transport |
//! | [`types`] | messages, model descriptors, result records |
//! | [`batch`] | batch execution with continue-on-failure |

pub mod batch;
pub mod client;
pub mod drivers;
pub mod lora;
pub mod pipeline;
pub mod structured;
pub mod transport;
pub mod types;
pub mod utils;

pub use client::{ChatParams, CourierClient, CourierClientBuilder, LoraJob, PromptType};
pub use drivers::Provider;
pub use types::{
    message::{Message, MessageRole},
    ConfigRecord, ModelDescriptor, NormalizedResult,
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A pinned, boxed stream of fallible items.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
