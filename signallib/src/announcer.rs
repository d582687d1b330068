use chrono::{FixedOffset, Utc};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::models::{Signal, SignalCache, TradeHypothesis};
use crate::telegram::messages::{self, NO_SIGNAL_TEXT, REMINDER_CAPTION, REMINDER_TEXT};
use crate::telegram::{TelegramClient, TelegramError};
use crate::util::Settings;

/// A message to post, decided from the cached signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Post {
    Text(String),
    Photo { caption: String, url: String },
    Document { caption: String, path: PathBuf },
}

struct PendingDelete {
    message_id: i64,
    timer: JoinHandle<()>,
}

/// Reads the signal cache and posts reminders and signals to Telegram.
///
/// Every post is deleted after `delete_after_minutes`; posts still waiting for deletion are
/// removed by [`Announcer::shutdown`].
pub struct Announcer {
    telegram: TelegramClient,
    cache: SignalCache,
    settings: Settings,
    pending: Mutex<Vec<PendingDelete>>,
}

impl Announcer {
    pub fn new(telegram: TelegramClient, cache: SignalCache, settings: Settings) -> Self {
        Announcer {
            telegram,
            cache,
            settings,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn bot_path(&self, hypothesis: TradeHypothesis) -> Option<&String> {
        match hypothesis {
            TradeHypothesis::Under(_) => self.settings.telegram.under_bot_path.as_ref(),
            TradeHypothesis::Over(_) => self.settings.telegram.over_bot_path.as_ref(),
        }
    }

    pub fn reminder(&self, signal: Option<&Signal>) -> Post {
        let path = signal.and_then(|signal| self.bot_path(signal.hypothesis));
        match path {
            Some(path) => Post::Document {
                caption: REMINDER_CAPTION.to_string(),
                path: PathBuf::from(path),
            },
            None => Post::Text(REMINDER_TEXT.to_string()),
        }
    }

    pub fn announcement(&self, signal: Option<&Signal>, now: chrono::DateTime<Utc>) -> Post {
        let signal = match signal {
            Some(signal) => signal,
            None => return Post::Text(NO_SIGNAL_TEXT.to_string()),
        };

        let offset: FixedOffset = self.settings.utc_offset();
        let valid_minutes = self.settings.signal_valid_minutes;
        let valid_until = self
            .settings
            .signal_validity()
            .and_then(|validity| now.checked_add_signed(validity))
            .unwrap_or(now)
            .with_timezone(&offset);
        let text = messages::signal_message(
            signal,
            self.settings.market_name(&signal.symbol),
            &valid_until,
            valid_minutes,
        );

        match &self.settings.telegram.image_url {
            Some(url) => Post::Photo {
                caption: text,
                url: url.clone(),
            },
            None => Post::Text(text),
        }
    }

    async fn post(&self, post: Post) -> Result<(), TelegramError> {
        let message_id = match &post {
            Post::Text(text) => self.telegram.send_message(text).await?,
            Post::Photo { caption, url } => self.telegram.send_photo(caption, url).await?,
            Post::Document { caption, path } => {
                self.telegram.send_document(caption, path).await?
            }
        };

        if let Some(message_id) = message_id {
            self.track(message_id).await;
        }
        Ok(())
    }

    async fn track(&self, message_id: i64) {
        let timer = self
            .telegram
            .schedule_delete(message_id, self.settings.delete_after());
        let mut pending = self.pending.lock().await;
        pending.retain(|p| !p.timer.is_finished());
        pending.push(PendingDelete { message_id, timer });
    }

    /// Cancels the delete timers and removes their messages now.
    pub async fn shutdown(&self) {
        let pending = std::mem::take(&mut *self.pending.lock().await);
        for p in pending {
            if p.timer.is_finished() {
                continue;
            }
            p.timer.abort();
            match self.telegram.delete_message(p.message_id).await {
                Ok(()) => log::info!("Removed message {}", p.message_id),
                Err(err) => log::warn!("Failed to remove message {}: {}", p.message_id, err),
            }
        }
    }

    /// Sent two minutes before the signal, right after a selection cycle.
    pub async fn send_reminder(&self) -> Result<(), TelegramError> {
        let signal = self.cache.current();
        let post = self.reminder(signal.as_deref());
        log::info!("Sending reminder");
        self.post(post).await
    }

    pub async fn send_signal(&self) -> Result<(), TelegramError> {
        let signal = self.cache.current();
        let post = self.announcement(signal.as_deref(), Utc::now());
        match &signal {
            Some(signal) => log::info!("Announcing {} {}", signal.symbol, signal.hypothesis),
            None => log::warn!("No signal cached, announcing failure"),
        }
        self.post(post).await
    }
}
