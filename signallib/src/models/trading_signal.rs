use chrono::{DateTime, Utc};

use crate::models::pattern::{CandidateResult, TradeHypothesis};

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub hypothesis: TradeHypothesis,
    pub entry_digit: Option<u8>,
    pub probability: f64, // percent
    pub created_at: DateTime<Utc>,
}

impl Signal {
    pub fn from_candidate(symbol: &str, candidate: CandidateResult) -> Self {
        Signal {
            symbol: symbol.to_string(),
            hypothesis: candidate.hypothesis,
            entry_digit: candidate.entry_digit,
            probability: candidate.probability,
            created_at: Utc::now(),
        }
    }

    pub fn label(&self) -> String {
        self.hypothesis.label()
    }
}
