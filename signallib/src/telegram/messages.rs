use chrono::{DateTime, TimeZone};

use crate::models::{Signal, TradeHypothesis};

const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '=', '|', '{', '}', '.', '!', '\\',
    '-',
];

pub const REMINDER_TEXT: &str = "⏰ *Reminder:* Signal in 2 minutes\\! Load your bot\\! \
     [app\\.binarytool\\.site](https://app.binarytool.site)";

pub const REMINDER_CAPTION: &str = "⏰ *Reminder:* Signal in 2 minutes\\! Load your bot at \
     [app\\.binarytool\\.site](https://app.binarytool.site)";

pub const NO_SIGNAL_TEXT: &str = "⚠️ *Signal Generation Failed*: No valid signal available";

pub const STARTUP_ERROR_TEXT: &str = "🔴 *Startup Error*: Could not connect to Deriv API";

/// Escapes every MarkdownV2 reserved character.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn bot_name(hypothesis: TradeHypothesis) -> &'static str {
    match hypothesis {
        TradeHypothesis::Under(_) => "Under 6 Signal Bot",
        TradeHypothesis::Over(_) => "Over 3 Signal Bot",
    }
}

pub fn signal_message<Tz>(
    signal: &Signal,
    market_name: &str,
    valid_until: &DateTime<Tz>,
    valid_minutes: i64,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let entry_point = match signal.entry_digit {
        Some(digit) => digit.to_string(),
        None => "-".to_string(),
    };
    let probability = format!("{:.2}%", signal.probability);
    let valid_until = valid_until.format("%I:%M %p").to_string();

    format!(
        "📌 *BINARYTOOL TRADING SIGNALS*\n\
         \n\
         ✅ *Market:* {}\n\
         🎯 *Trade Type:* {}\n\
         🤖 *Bot Used:* {}\n\
         🔢 *Entry Point:* {}\n\
         📊 *Probability:* {}\n\
         ⏱️ *Tick Duration:* 1\n\
         \n\
         📅 *Valid Until:* {} \\({} minutes\\)\n\
         \n\
         ⚠️ *Note:* Apply good risk management\\.",
        escape_markdown(market_name),
        escape_markdown(&signal.label()),
        escape_markdown(bot_name(signal.hypothesis)),
        escape_markdown(&entry_point),
        escape_markdown(&probability),
        escape_markdown(&valid_until),
        valid_minutes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn signal(hypothesis: TradeHypothesis, entry_digit: Option<u8>) -> Signal {
        Signal {
            symbol: "R_50".to_string(),
            hypothesis,
            entry_digit,
            probability: 16.666666,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(escape_markdown("16.67%"), "16\\.67%");
        assert_eq!(escape_markdown("a_b*c[d](e)"), "a\\_b\\*c\\[d\\]\\(e\\)");
        assert_eq!(escape_markdown("x-y!z\\"), "x\\-y\\!z\\\\");
        assert_eq!(escape_markdown("Volatility 10 Index"), "Volatility 10 Index");
    }

    #[test]
    fn signal_message_lists_every_field() {
        let nairobi = FixedOffset::east_opt(3 * 3600).unwrap();
        let valid_until = nairobi.with_ymd_and_hms(2024, 5, 1, 14, 5, 0).unwrap();
        let message = signal_message(
            &signal(TradeHypothesis::UNDER_SIX, Some(7)),
            "Volatility 50 Index",
            &valid_until,
            5,
        );

        assert!(message.starts_with("📌 *BINARYTOOL TRADING SIGNALS*\n\n"));
        assert!(message.contains("✅ *Market:* Volatility 50 Index\n"));
        assert!(message.contains("🎯 *Trade Type:* UNDER 6\n"));
        assert!(message.contains("🤖 *Bot Used:* Under 6 Signal Bot\n"));
        assert!(message.contains("🔢 *Entry Point:* 7\n"));
        assert!(message.contains("📊 *Probability:* 16\\.67%\n"));
        assert!(message.contains("📅 *Valid Until:* 02:05 PM \\(5 minutes\\)\n"));
        assert!(message.ends_with("Apply good risk management\\."));
    }

    #[test]
    fn undefined_entry_is_escaped_placeholder() {
        let valid_until = Utc.with_ymd_and_hms(2024, 5, 1, 0, 5, 0).unwrap();
        let message = signal_message(
            &signal(TradeHypothesis::OVER_THREE, None),
            "R_50",
            &valid_until,
            5,
        );
        assert!(message.contains("🔢 *Entry Point:* \\-\n"));
        assert!(message.contains("🤖 *Bot Used:* Over 3 Signal Bot\n"));
        assert!(message.contains("R\\_50"));
    }
}
