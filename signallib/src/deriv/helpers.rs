use serde::Deserialize;
use serde_json::Value;

use crate::deriv::objects::Quote;

// Deriv sends prices as JSON numbers, occasionally as strings. Anything else is kept in its
// printed form so the digit extractor can reject it without dropping the whole frame.
pub fn deserialize_quotes<'de, D>(deserializer: D) -> Result<Vec<Quote>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<Value> = Deserialize::deserialize(deserializer)?;
    Ok(values.into_iter().map(quote_from_value).collect())
}

pub fn quote_from_value(value: Value) -> Quote {
    match value {
        Value::String(s) => Quote(s),
        // Shortest round-trip form: 1234.50 is printed as "1234.5"
        other => Quote(other.to_string()),
    }
}
