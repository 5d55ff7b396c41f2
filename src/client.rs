//! Courier client.
//!
//! [`CourierClient`] ties the pure builders and normalizers to a [`Transport`]:
//! every operation builds one request, sends it, and shapes the answer.
//! Implementation details are split into submodules under `src/client/`.
//!
//! [`Transport`]: crate::transport::Transport

pub mod chat;
pub mod core;
pub mod lora;
pub mod messages;
pub mod models;

pub use self::core::{CourierClient, CourierClientBuilder};
pub use chat::{ChatParams, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE};
pub use lora::LoraJob;
pub use messages::{build_messages, PromptType};
pub use models::{ManageAction, Quantization};
