//! Deterministic post fingerprints used for deduplication

use chrono::{DateTime, Timelike, Utc};

/// Render a watch date the way fingerprints expect it.
///
/// `YYYY-MM-DD HH:MM:SS[.ffffff]+00:00`, fractional part only when non-zero,
/// or the literal `None` when the date is absent.
pub fn date_key(date: Option<&DateTime<Utc>>) -> String {
    match date {
        None => "None".to_string(),
        Some(d) => {
            let micros = d.nanosecond() / 1_000;
            if micros == 0 {
                format!("{}+00:00", d.format("%Y-%m-%d %H:%M:%S"))
            } else {
                format!("{}.{:06}+00:00", d.format("%Y-%m-%d %H:%M:%S"), micros)
            }
        }
    }
}

/// Hex BLAKE3 digest of the normalized (title, channel, date) triple
pub fn fingerprint(title: &str, channel: &str, date: Option<&DateTime<Utc>>) -> String {
    let key = format!(
        "{}_{}_{}",
        title.trim().to_lowercase(),
        channel.trim().to_lowercase(),
        date_key(date)
    );
    blake3::hash(key.as_bytes()).to_hex().to_string()
}
