use std::time::Duration;
use tokio::sync::Mutex;

use crate::deriv::{CollectError, Market, TickSource};
use crate::models::cache::SignalCache;
use crate::models::digits::extract_digits;
use crate::models::pattern::{analyze, CandidateResult};
use crate::models::trading_signal::Signal;

pub const DEFAULT_TICK_COUNT: usize = 5000;
pub const DEFAULT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(20);

/// Outcome of analysing one market.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    NoQuotes,
    /// Quotes arrived but none ended in a digit
    NoDigits { quotes: usize },
    Candidate(CandidateResult),
}

/// Runs one selection cycle across all markets and publishes the winner to the cache.
pub struct SignalSelector<S: TickSource> {
    source: S,
    cache: SignalCache,
    window: usize,
    timeout: Duration,
    // Held for the whole cycle so two cycles never race on the cache
    cycle: Mutex<()>,
}

impl<S: TickSource> SignalSelector<S> {
    pub fn new(source: S, cache: SignalCache, window: usize, timeout: Duration) -> Self {
        SignalSelector {
            source,
            cache,
            window,
            timeout,
            cycle: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &SignalCache {
        &self.cache
    }

    async fn evaluate(&self, symbol: &str) -> Result<Evaluation, CollectError> {
        let quotes = self.source.collect(symbol, self.window, self.timeout).await?;
        let digits = extract_digits(&quotes);
        log::info!(
            "[{}] Collected {} quotes, {} usable digits",
            symbol,
            quotes.len(),
            digits.len()
        );

        if quotes.is_empty() {
            return Ok(Evaluation::NoQuotes);
        }
        if digits.is_empty() {
            return Ok(Evaluation::NoDigits {
                quotes: quotes.len(),
            });
        }
        Ok(Evaluation::Candidate(analyze(&digits)))
    }

    /// Evaluates `markets` in order and keeps the first candidate with the highest probability.
    ///
    /// The cache is overwritten with the result, including `None` when no market produced data.
    pub async fn select_best(&self, markets: &[Market]) -> Option<Signal> {
        let _cycle = self.cycle.lock().await;

        let mut best: Option<Signal> = None;
        for market in markets {
            let candidate = match self.evaluate(&market.symbol).await {
                Ok(Evaluation::Candidate(candidate)) => candidate,
                Ok(Evaluation::NoQuotes) => {
                    log::warn!("[{}] No ticks collected, skipping", market.symbol);
                    continue;
                }
                Ok(Evaluation::NoDigits { quotes }) => {
                    log::warn!(
                        "[{}] None of {} quotes ended in a digit, skipping",
                        market.symbol,
                        quotes
                    );
                    continue;
                }
                Err(err) => {
                    log::warn!("[{}] Collection failed, skipping: {}", market.symbol, err);
                    continue;
                }
            };

            log::info!(
                "[{}] {} entry {:?} at {:.2}%",
                market.symbol,
                candidate.hypothesis,
                candidate.entry_digit,
                candidate.probability
            );

            let replaces = match &best {
                Some(current) => candidate.probability > current.probability,
                None => true,
            };
            if replaces {
                best = Some(Signal::from_candidate(&market.symbol, candidate));
            }
        }

        match &best {
            Some(signal) => log::info!(
                "Selected {} {} entry {:?} ({:.2}%)",
                signal.symbol,
                signal.hypothesis,
                signal.entry_digit,
                signal.probability
            ),
            None => log::warn!("No market produced a signal"),
        }

        self.cache.publish(best.clone());
        best
    }
}
