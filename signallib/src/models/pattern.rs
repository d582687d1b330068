use serde::{Deserialize, Serialize};

/// A rule about the digit that follows the entry digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeHypothesis {
    /// Next digit is strictly below the threshold
    Under(u8),
    /// Next digit is strictly above the threshold
    Over(u8),
}

impl TradeHypothesis {
    pub const UNDER_SIX: TradeHypothesis = TradeHypothesis::Under(6);
    pub const OVER_THREE: TradeHypothesis = TradeHypothesis::Over(3);

    pub fn admits(&self, digit: u8) -> bool {
        match *self {
            TradeHypothesis::Under(threshold) => digit < threshold,
            TradeHypothesis::Over(threshold) => digit > threshold,
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for TradeHypothesis {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TradeHypothesis::Under(threshold) => write!(f, "UNDER {}", threshold),
            TradeHypothesis::Over(threshold) => write!(f, "OVER {}", threshold),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateResult {
    pub hypothesis: TradeHypothesis,
    // None when no transition satisfied the hypothesis
    pub entry_digit: Option<u8>,
    pub probability: f64, // percent, 0.0..=100.0
}

/// Number of times each digit precedes a digit admitted by `hypothesis`.
pub fn count_predecessors(digits: &[u8], hypothesis: TradeHypothesis) -> [u32; 10] {
    let mut counts = [0u32; 10];
    for pair in digits.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if hypothesis.admits(current) {
            if let Some(count) = counts.get_mut(previous as usize) {
                *count += 1;
            }
        }
    }
    counts
}

pub fn analyze_hypothesis(digits: &[u8], hypothesis: TradeHypothesis) -> CandidateResult {
    let counts = count_predecessors(digits, hypothesis);
    let total: u32 = counts.iter().sum();

    if total == 0 {
        return CandidateResult {
            hypothesis,
            entry_digit: None,
            probability: 0.0,
        };
    }

    // Strict comparison keeps the lowest digit on ties
    let mut best_digit = 0;
    for digit in 1..counts.len() {
        if counts[digit] > counts[best_digit] {
            best_digit = digit;
        }
    }

    CandidateResult {
        hypothesis,
        entry_digit: Some(best_digit as u8),
        probability: counts[best_digit] as f64 / total as f64 * 100.0,
    }
}

/// Best of `UNDER 6` and `OVER 3`. `UNDER 6` only wins with a strictly higher probability.
pub fn analyze(digits: &[u8]) -> CandidateResult {
    let under = analyze_hypothesis(digits, TradeHypothesis::UNDER_SIX);
    let over = analyze_hypothesis(digits, TradeHypothesis::OVER_THREE);

    if under.probability > over.probability {
        under
    } else {
        over
    }
}
