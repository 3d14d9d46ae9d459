use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Show-value token that matches a field without a value.
pub const NULL_TOKEN: &str = "null";

/// How the `"null"` show-value token treats the literal string `"null"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NullMatching {
    /// A missing value and the string `"null"` both match the token.
    #[default]
    Lenient,
    /// Only a missing value matches the token.
    Strict,
}

/// Stringifies a scalar the way show values are compared: `true` becomes
/// `"true"`, `3` becomes `"3"`, `null` becomes the null token.
pub fn scalar_to_show_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(NULL_TOKEN.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Converts a submitted or live control value into its comparable form.
/// `null` stays absent; multi-select arrays are joined with commas.
pub fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| field_value(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}
