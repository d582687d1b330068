use thiserror::Error;

use crate::deriv::Quote;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("empty quote")]
    Empty,
    #[error("quote {0:?} does not end in a digit")]
    NotADigit(String),
}

/// Last decimal digit of a quote, the unit of pattern analysis.
pub fn extract(quote: &str) -> Result<u8, ExtractError> {
    let last = quote.chars().last().ok_or(ExtractError::Empty)?;
    last.to_digit(10)
        .map(|digit| digit as u8)
        .ok_or_else(|| ExtractError::NotADigit(quote.to_string()))
}

/// Extracts digits in order, dropping quotes that have none.
pub fn extract_digits(quotes: &[Quote]) -> Vec<u8> {
    quotes
        .iter()
        .filter_map(|quote| match extract(quote.as_str()) {
            Ok(digit) => Some(digit),
            Err(err) => {
                log::debug!("Dropping quote: {}", err);
                None
            }
        })
        .collect()
}
