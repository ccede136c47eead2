//! Validity period parsing.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Parse a validity period.
///
/// Accepts the clock form `[d.]hh:mm[:ss[.fraction]]` or a short form with
/// a unit suffix: `30s`, `5m`, `1h`, `1d`, `1w`.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains(':') {
        return parse_clock(input);
    }

    let unit_at = input.len() - input.chars().last()?.len_utf8();
    let (digits, unit) = input.split_at(unit_at);
    let amount: u64 = digits.parse().ok()?;

    let seconds = match unit {
        "s" => amount,
        "m" => amount.checked_mul(60)?,
        "h" => amount.checked_mul(3600)?,
        "d" => amount.checked_mul(86400)?,
        "w" => amount.checked_mul(604800)?,
        _ => return None,
    };

    Some(Duration::from_secs(seconds))
}

fn parse_clock(input: &str) -> Option<Duration> {
    let parts: Vec<&str> = input.split(':').collect();
    let (head, minutes, seconds) = match parts.as_slice() {
        [head, minutes] => (*head, *minutes, "0"),
        [head, minutes, seconds] => (*head, *minutes, *seconds),
        _ => return None,
    };

    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (days.parse::<u64>().ok()?, hours.parse::<u64>().ok()?),
        None => (0, head.parse::<u64>().ok()?),
    };
    let minutes: u64 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    let (whole, nanos) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, parse_fraction(fraction)?),
        None => (seconds, 0),
    };
    let whole: u64 = whole.parse().ok()?;
    if whole > 59 {
        return None;
    }

    let total = days
        .checked_mul(86400)?
        .checked_add(hours * 3600 + minutes * 60 + whole)?;
    Some(Duration::new(total, nanos))
}

fn parse_fraction(fraction: &str) -> Option<u32> {
    if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{fraction:0<9}");
    padded.parse().ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

/// Serde adapter for validity periods given as text or whole seconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
        RawDuration::Text(text) => parse_duration(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid validity period '{text}'"))),
    }
}
