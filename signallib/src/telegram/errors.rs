use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read attachment: {0}")]
    Io(#[from] std::io::Error),

    #[error("Telegram API error: {0}")]
    Api(String),
}
