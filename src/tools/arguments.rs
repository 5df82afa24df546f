//! Typed access to tool call arguments.

use serde_json::Value;

use crate::error::BriefError;

/// Wrapper around the JSON arguments a model supplied for a tool call.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: Value,
}

impl ToolArguments {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Deserialize the entire arguments into a typed struct.
    ///
    /// Models occasionally send the arguments object as a JSON-encoded string;
    /// that form is decoded first.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, BriefError> {
        let value = match &self.value {
            Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str::<Value>(trimmed).map_err(|e| {
                        BriefError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
                    })?
                }
            }
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| {
            BriefError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
