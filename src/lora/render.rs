//! Training config document rendering.

use super::config::{non_blank, LoraConfig};
use serde_json::Value;

/// Attention projections LoRA adapters are attached to.
pub const LORA_KEYS: &str = r#"["self_attn.q_proj", "self_attn.v_proj"]"#;
pub const RESUME_FILE: &str = "adapters.safetensors";

/// Render the training config as a YAML document.
///
/// Field order is fixed. Missing or `null` numeric fields render as `0`,
/// except `scale` (`1`) and `train` (`all`). `model` and the paths are quoted
/// with `"` escaped; `train` is written bare. The resume line only appears for
/// a non-blank `resume_adapter`. Lines are joined by `\n` without a trailing
/// newline.
pub fn render(config: &LoraConfig, adapter_path: &str, resume_adapter: Option<&str>) -> String {
    let field = |key: &str, default: &str| -> String {
        match config.get(key) {
            None | Some(Value::Null) => default.to_string(),
            Some(v) => scalar(v),
        }
    };

    let mut lines = vec![
        format!("model: {}", quoted(&field("model", ""))),
        r#"data: "dataset""#.to_string(),
        format!("iters: {}", field("iters", "0")),
        format!("num_layers: {}", field("num_layers", "0")),
        format!("batch_size: {}", field("batch_size", "0")),
        format!("learning_rate: {}", field("learning_rate", "0")),
        format!("adapter_path: {}", quoted(adapter_path)),
        format!("train: {}", field("train", "all")),
        format!("max_seq_length: {}", field("max_seq_length", "0")),
        format!("val_batches: {}", field("val_batches", "0")),
        String::new(),
    ];

    if let Some(resume) = non_blank(resume_adapter) {
        lines.push(format!(
            "resume_adapter_file: \"{}/{}\"",
            escape(resume),
            RESUME_FILE
        ));
        lines.push(String::new());
    }

    lines.push("lora_parameters:".to_string());
    lines.push(format!("  keys: {}", LORA_KEYS));
    lines.push(format!("  rank: {}", field("rank", "0")));
    lines.push(format!("  alpha: {}", field("alpha", "0")));
    lines.push(format!("  scale: {}", field("scale", "1")));
    lines.push(format!("  dropout: {}", field("dropout", "0")));

    lines.join("\n")
}

fn escape(s: &str) -> String {
    s.replace('"', "\\\"")
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

/// Plain text of a scalar. Whole floats print without a fraction.
fn scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        other => other.to_string(),
    }
}
