//! Core data types shared by the adapters, the stream parser and the client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | One conversation turn (role + content) |
//! | [`ModelDescriptor`] | Model identity resolved from the caller's selection |
//! | [`ModelOption`] | One entry of a shaped model listing |
//! | [`NormalizedResult`] | Provider-independent chat result |
//! | [`ConfigRecord`] | Output of LoRA config generation |
//! | [`ErrorRecord`] | Stand-in for a failed batch item |

pub mod message;
pub mod model;
pub mod result;

pub use message::{Message, MessageRole};
pub use model::{ModelDescriptor, ModelOption, ModelType};
pub use result::{Canonical, ConfigRecord, ErrorRecord, NormalizedResult};
