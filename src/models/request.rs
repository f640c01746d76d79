use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw body of a send request as it arrives from the caller. Every field is
/// optional here; the validator decides which ones a channel requires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(default)]
    pub channel: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub to: Option<String>,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub chat_id: Option<String>,

    #[serde(default, rename = "type")]
    pub channel_type: Option<String>,

    #[serde(default)]
    pub message_type: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "chatId must be a string or number, got {}",
            other
        ))),
    }
}
