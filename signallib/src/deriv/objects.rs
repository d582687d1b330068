use serde::{Deserialize, Serialize};

use crate::deriv::helpers::deserialize_quotes;

pub const DERIV_WS_URL: &str = "wss://ws.derivws.com/websockets/v3";

fn default_url() -> String {
    DERIV_WS_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DerivSettings {
    pub app_id: String,
    #[serde(default = "default_url")]
    pub url: String,
}

impl DerivSettings {
    pub fn endpoint(&self) -> String {
        format!("{}?app_id={}", self.url, self.app_id)
    }
}

/// A tradable synthetic index and the name shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub symbol: String,
    pub name: String,
}

impl Market {
    pub fn new(symbol: &str, name: &str) -> Self {
        Market {
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }
}

pub fn default_markets() -> Vec<Market> {
    vec![
        Market::new("R_10", "Volatility 10 Index"),
        Market::new("R_25", "Volatility 25 Index"),
        Market::new("R_50", "Volatility 50 Index"),
        Market::new("R_75", "Volatility 75 Index"),
        Market::new("R_100", "Volatility 100 Index"),
    ]
}

/// A raw price quote as printed by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote(pub String);

impl Quote {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Quote {
    fn from(s: &str) -> Self {
        Quote(s.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct TicksHistoryRequest {
    pub ticks_history: String,
    pub count: usize,
    pub end: &'static str,
    pub style: &'static str,
}

impl TicksHistoryRequest {
    pub fn new(symbol: &str, count: usize) -> Self {
        TicksHistoryRequest {
            ticks_history: symbol.to_string(),
            count,
            end: "latest",
            style: "ticks",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TickHistory {
    #[serde(deserialize_with = "deserialize_quotes")]
    pub prices: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

// Deriv echoes the request type in msg_type; failed requests keep the type and carry `error`
#[derive(Debug, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum StreamItem {
    History {
        #[serde(default)]
        history: Option<TickHistory>,
        #[serde(default)]
        error: Option<ApiError>,
    },
    #[serde(other)]
    Other,
}
