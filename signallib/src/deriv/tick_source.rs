use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::deriv::errors::CollectError;
use crate::deriv::objects::{DerivSettings, Quote, StreamItem, TicksHistoryRequest};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Source of historical ticks for one symbol.
///
/// Implementations return whatever was gathered before `timeout`, which may be shorter than
/// `window`. An `Err` means nothing could be collected at all.
#[async_trait]
pub trait TickSource: Send + Sync {
    async fn collect(
        &self,
        symbol: &str,
        window: usize,
        timeout: Duration,
    ) -> Result<Vec<Quote>, CollectError>;
}

/// Collects tick history over a short-lived Deriv websocket connection.
pub struct DerivTickSource {
    url: String,
    poll_interval: Duration,
}

impl DerivTickSource {
    pub fn new(url: impl Into<String>) -> Self {
        DerivTickSource {
            url: url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn from_settings(settings: &DerivSettings) -> Self {
        Self::new(settings.endpoint())
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        // tokio intervals reject a zero period
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }
}

// Runs on its own task. Quotes are appended to the shared buffer as soon as the history
// reply arrives; the caller only ever observes the buffer.
async fn fetch_history(
    url: String,
    request: TicksHistoryRequest,
    buffer: Arc<Mutex<Vec<Quote>>>,
) -> Result<(), CollectError> {
    let (ws_stream, _) = connect_async(url.as_str()).await?;
    let (mut write, mut read) = ws_stream.split();

    let payload = serde_json::to_string(&request)?;
    write.send(Message::Text(payload.into())).await?;

    while let Some(msg) = read.next().await {
        match msg? {
            Message::Text(text) => match serde_json::from_str::<StreamItem>(&text) {
                Ok(StreamItem::History {
                    history: Some(history),
                    ..
                }) => {
                    log::debug!(
                        "[{}] Received {} historical ticks",
                        request.ticks_history,
                        history.prices.len()
                    );
                    buffer.lock().await.extend(history.prices);
                    // Single reply protocol, nothing else is expected on this connection
                    let _ = write.close().await;
                    return Ok(());
                }
                Ok(StreamItem::History {
                    error: Some(error), ..
                }) => {
                    let _ = write.close().await;
                    return Err(CollectError::Api {
                        code: error.code,
                        message: error.message,
                    });
                }
                Ok(_) => {
                    log::trace!("[{}] Ignoring message: {}", request.ticks_history, text.as_str());
                }
                Err(err) => {
                    log::debug!("[{}] Error parsing JSON: {}", request.ticks_history, err);
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    Ok(())
}

#[async_trait]
impl TickSource for DerivTickSource {
    async fn collect(
        &self,
        symbol: &str,
        window: usize,
        timeout: Duration,
    ) -> Result<Vec<Quote>, CollectError> {
        let buffer = Arc::new(Mutex::new(Vec::with_capacity(window)));
        let request = TicksHistoryRequest::new(symbol, window);
        let mut worker = tokio::spawn(fetch_history(self.url.clone(), request, buffer.clone()));

        let deadline = Instant::now() + timeout;
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut failure = None;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if buffer.lock().await.len() >= window {
                        break;
                    }
                    if worker.is_finished() {
                        failure = match (&mut worker).await {
                            Ok(Ok(())) => None,
                            Ok(Err(err)) => Some(err),
                            Err(err) => Some(CollectError::Worker(err.to_string())),
                        };
                        break;
                    }
                }
                _ = tokio::time::sleep_until(deadline) => {
                    log::warn!("[{}] Collection timed out after {:?}", symbol, timeout);
                    break;
                }
            }
        }
        // No-op if the worker already finished; otherwise drops the connection
        worker.abort();

        let quotes = std::mem::take(&mut *buffer.lock().await);
        match failure {
            Some(err) if quotes.is_empty() => Err(err),
            Some(err) => {
                log::warn!("[{}] Collection ended early: {}", symbol, err);
                Ok(quotes)
            }
            None => Ok(quotes),
        }
    }
}

/// Opens and closes a connection to verify the endpoint is reachable.
pub async fn check_connectivity(url: &str, timeout: Duration) -> Result<(), CollectError> {
    let (mut ws_stream, _) = tokio::time::timeout(timeout, connect_async(url))
        .await
        .map_err(|_| CollectError::Timeout(timeout))??;
    let _ = ws_stream.close(None).await;
    Ok(())
}
