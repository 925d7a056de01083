use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{type, data}` envelope a tool result hands to the presentation layer.
/// Together with the human-readable `message` string it is the only contract
/// the UI consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub data: Value,
}

impl UiComponent {
    pub fn new(component_type: impl Into<String>, data: Value) -> Self {
        Self {
            component_type: component_type.into(),
            data,
        }
    }
}
