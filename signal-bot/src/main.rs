mod scheduler;

use signallib::announcer::Announcer;
use signallib::deriv::{self, DerivTickSource};
use signallib::logging;
use signallib::models::{SignalCache, SignalSelector};
use signallib::telegram::{messages, TelegramClient};
use signallib::util;

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scheduler::Event;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// Sleeps until `at`, waking every second to notice SIGINT. Returns false if interrupted.
async fn sleep_until(at: chrono::DateTime<Utc>, running: &AtomicBool) -> bool {
    while running.load(Ordering::SeqCst) {
        let remaining = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        if remaining.is_zero() {
            return true;
        }
        tokio::time::sleep(remaining.min(Duration::from_secs(1))).await;
    }
    false
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle SIGINT
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    // Configure logger
    logging::configure_logger("logs/signal-bot.log")?;

    // Read settings
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| util::SETTINGS_PATH.to_string());
    let settings = util::read_settings(&path).unwrap_or_else(|err| {
        log::error!("Failed to read settings from {}: {}", path, err);
        std::process::exit(1);
    });

    let telegram = TelegramClient::new(&settings.telegram);
    let endpoint = settings.deriv.endpoint();

    log::info!("Checking connection to Deriv...");
    if let Err(err) = deriv::check_connectivity(&endpoint, CONNECT_TIMEOUT).await {
        log::error!("Could not connect to Deriv API: {}", err);
        if let Err(err) = telegram.send_message(messages::STARTUP_ERROR_TEXT).await {
            log::error!("Failed to report startup error: {}", err);
        }
        std::process::exit(1);
    }

    let cache = SignalCache::new();
    let source = DerivTickSource::from_settings(&settings.deriv)
        .with_poll_interval(settings.poll_interval());
    let selector = SignalSelector::new(
        source,
        cache.clone(),
        settings.tick_count,
        settings.collection_timeout(),
    );
    let markets = settings.markets.clone();
    let offset = settings.utc_offset();
    let announcer = Announcer::new(telegram, cache, settings);

    log::info!("Running initial selection over {} markets...", markets.len());
    selector.select_best(&markets).await;

    let (mut at, mut event) = scheduler::next_event(&Utc::now().with_timezone(&offset));
    while running.load(Ordering::SeqCst) {
        log::info!("Next event: {:?} at {}", event, at.format("%H:%M"));

        if !sleep_until(at.with_timezone(&Utc), &running).await {
            break;
        }

        match event {
            Event::Prepare => {
                selector.select_best(&markets).await;
                if let Err(err) = announcer.send_reminder().await {
                    log::error!("Failed to send reminder: {}", err);
                }
            }
            Event::Announce => {
                if let Err(err) = announcer.send_signal().await {
                    log::error!("Failed to send signal: {}", err);
                }
            }
        }

        let now = Utc::now().with_timezone(&offset);
        (at, event) = scheduler::event_after(&at, event, &now);
    }

    log::info!("Received SIGINT, removing pending messages and exiting...");
    announcer.shutdown().await;
    Ok(())
}
