use serde::Deserialize;
use serde_json::Value;

pub const API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub under_bot_path: Option<String>,
    #[serde(default)]
    pub over_bot_path: Option<String>,
}

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ApiResponse {
    pub fn message_id(&self) -> Option<i64> {
        self.result
            .as_ref()
            .and_then(|result| result.get("message_id"))
            .and_then(Value::as_i64)
    }
}
