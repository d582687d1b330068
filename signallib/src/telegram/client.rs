use reqwest::multipart::{Form, Part};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::telegram::errors::TelegramError;
use crate::telegram::objects::{ApiResponse, TelegramSettings, API_URL};

const PARSE_MODE: &str = "MarkdownV2";

/// Minimal Bot API client for posting to a single chat.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(settings: &TelegramSettings) -> Self {
        TelegramClient {
            client: reqwest::Client::new(),
            api_url: API_URL.to_string(),
            bot_token: settings.bot_token.clone(),
            chat_id: settings.chat_id.clone(),
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    async fn read_response(response: reqwest::Response) -> Result<ApiResponse, TelegramError> {
        // Telegram reports failures in the body, with a non-success status
        let body = response.text().await?;
        let reply: ApiResponse = serde_json::from_str(&body)
            .map_err(|err| TelegramError::Api(format!("unreadable reply ({}): {}", err, body)))?;

        if !reply.ok {
            return Err(TelegramError::Api(
                reply
                    .description
                    .unwrap_or_else(|| "request rejected without description".to_string()),
            ));
        }
        Ok(reply)
    }

    async fn post_json(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<ApiResponse, TelegramError> {
        let response = self
            .client
            .post(self.endpoint(method))
            .json(&payload)
            .send()
            .await?;
        Self::read_response(response).await
    }

    pub async fn send_message(&self, text: &str) -> Result<Option<i64>, TelegramError> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": PARSE_MODE,
        });
        Ok(self.post_json("sendMessage", payload).await?.message_id())
    }

    pub async fn send_photo(
        &self,
        caption: &str,
        photo_url: &str,
    ) -> Result<Option<i64>, TelegramError> {
        let payload = json!({
            "chat_id": self.chat_id,
            "photo": photo_url,
            "caption": caption,
            "parse_mode": PARSE_MODE,
        });
        Ok(self.post_json("sendPhoto", payload).await?.message_id())
    }

    /// Uploads a local file as a document.
    pub async fn send_document(
        &self,
        caption: &str,
        path: &Path,
    ) -> Result<Option<i64>, TelegramError> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", PARSE_MODE)
            .part("document", Part::bytes(contents).file_name(file_name));

        let response = self
            .client
            .post(self.endpoint("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        Ok(Self::read_response(response).await?.message_id())
    }

    pub async fn delete_message(&self, message_id: i64) -> Result<(), TelegramError> {
        let payload = json!({
            "chat_id": self.chat_id,
            "message_id": message_id,
        });
        self.post_json("deleteMessage", payload).await?;
        Ok(())
    }

    /// Deletes `message_id` after `after` on a background task.
    pub fn schedule_delete(&self, message_id: i64, after: Duration) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            match client.delete_message(message_id).await {
                Ok(()) => log::debug!("Deleted message {}", message_id),
                Err(err) => log::warn!("Failed to delete message {}: {}", message_id, err),
            }
        })
    }
}
