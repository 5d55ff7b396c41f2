use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Parameter or field that caused the error (e.g., "model", "messages")
    pub field_path: Option<String>,
    /// Parser diagnostic or other detail about the failure
    pub details: Option<String>,
    /// Component that raised the error (e.g., "message_builder", "model_resolver")
    pub source: Option<String>,
    /// Index of the batch item being processed, when known
    pub item_index: Option<usize>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_item_index(mut self, index: usize) -> Self {
        self.item_index = Some(index);
        self
    }
}

/// Unified error type for the gateway.
///
/// Parsing problems that have a documented fallback never reach this type;
/// everything here is fatal to the item that produced it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {message}{}", format_context(.context))]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    #[error("No remote LoRA config found for dataset_id={dataset_id}")]
    ConfigNotFound { dataset_id: String },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A context-less error raised while processing one batch item.
    #[error("Batch item {index} failed: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(index) = ctx.item_index {
        parts.push(format!("item: {}", index));
    }
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new invalid-input error with structured context
    pub fn invalid_input_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidInput {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InvalidInput { context, .. } | Error::Configuration { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// Tag the error with the batch item it came from.
    ///
    /// Errors with a context record the index there; any other error is
    /// wrapped in [`Error::Item`]. An index already present is kept.
    pub fn at_item(self, index: usize) -> Self {
        match self {
            Error::InvalidInput {
                message,
                mut context,
            } => {
                context.item_index.get_or_insert(index);
                Error::InvalidInput { message, context }
            }
            Error::Configuration {
                message,
                mut context,
            } => {
                context.item_index.get_or_insert(index);
                Error::Configuration { message, context }
            }
            item @ Error::Item { .. } => item,
            other => Error::Item {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Index of the batch item this error came from, when known.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            Error::Item { index, .. } => Some(*index),
            other => other.context().and_then(|c| c.item_index),
        }
    }

    /// The underlying error, without any batch item wrapper.
    pub fn inner(&self) -> &Error {
        match self {
            Error::Item { source, .. } => source.inner(),
            other => other,
        }
    }
}
