//! Full selection cycles over websocket-served tick history.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use signallib::deriv::{DerivTickSource, Market};
use signallib::models::{SignalCache, SignalSelector, TradeHypothesis};

/// Replies to each history request with the prices configured for its symbol.
/// Unknown symbols get no reply at all.
async fn serve_markets(prices: HashMap<&'static str, Vec<Value>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let prices = Arc::new(prices);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let prices = prices.clone();
            tokio::spawn(async move {
                let mut ws = match accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => return,
                };
                while let Some(Ok(msg)) = ws.next().await {
                    let Message::Text(text) = msg else { continue };
                    let request: Value = match serde_json::from_str(text.as_str()) {
                        Ok(request) => request,
                        Err(_) => continue,
                    };
                    let symbol = request["ticks_history"].as_str().unwrap_or_default();
                    if let Some(prices) = prices.get(symbol) {
                        let reply = json!({
                            "echo_req": request,
                            "msg_type": "history",
                            "history": {"prices": prices}
                        });
                        let _ = ws.send(Message::Text(reply.to_string().into())).await;
                    }
                }
            });
        }
    });

    format!("ws://{}", addr)
}

fn quotes(digits: &[u8]) -> Vec<Value> {
    digits
        .iter()
        .map(|d| Value::String(format!("1000.{}", d)))
        .collect()
}

fn selector(url: String) -> SignalSelector<DerivTickSource> {
    let source = DerivTickSource::new(url).with_poll_interval(Duration::from_millis(50));
    SignalSelector::new(source, SignalCache::new(), 5000, Duration::from_millis(500))
}

#[tokio::test]
async fn hand_computed_sequence_is_cached() {
    let url = serve_markets(HashMap::from([(
        "R_10",
        quotes(&[7, 2, 9, 1, 8, 4, 3, 6, 0, 5]),
    )]))
    .await;
    let selector = selector(url);
    let reader = selector.cache().clone();

    let signal = selector
        .select_best(&[Market::new("R_10", "Volatility 10 Index")])
        .await
        .unwrap();

    // OVER 3 counts predecessors 2, 1, 8, 3, 0 once each (1/5),
    // beating UNDER 6 with six predecessors (1/6)
    let cached = reader.current().unwrap();
    assert_eq!(*cached, signal);
    assert_eq!(cached.hypothesis, TradeHypothesis::OVER_THREE);
    assert_eq!(cached.entry_digit, Some(0));
    assert!((cached.probability - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn silent_markets_are_skipped() {
    // R_25 never answers, R_50 answers with unusable quotes
    let url = serve_markets(HashMap::from([
        ("R_10", quotes(&[1, 0, 2, 0, 1])),
        ("R_50", vec![json!("n/a"), json!("1000.")]),
        ("R_75", quotes(&[1, 0])),
    ]))
    .await;
    let selector = selector(url);

    let markets = vec![
        Market::new("R_10", "Volatility 10 Index"),
        Market::new("R_25", "Volatility 25 Index"),
        Market::new("R_50", "Volatility 50 Index"),
        Market::new("R_75", "Volatility 75 Index"),
    ];
    let signal = selector.select_best(&markets).await.unwrap();

    assert_eq!(signal.symbol, "R_75");
    assert_eq!(signal.hypothesis, TradeHypothesis::UNDER_SIX);
    assert_eq!(signal.entry_digit, Some(1));
    assert_eq!(signal.probability, 100.0);
}

#[tokio::test]
async fn cycle_without_data_leaves_cache_empty() {
    let url = serve_markets(HashMap::new()).await;
    let selector = selector(url);

    let markets = vec![Market::new("R_10", "Volatility 10 Index")];
    assert!(selector.select_best(&markets).await.is_none());
    assert!(selector.cache().current().is_none());
}
