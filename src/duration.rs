//! Human-readable durations used in config and manifests (`500ms`, `5s`, `1m`, `2h`)

use anyhow::{Context, Result};
use std::time::Duration;

/// Parse a duration string
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let ms: u64 = ms.parse().context("Invalid milliseconds in duration")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(secs) = s.strip_suffix('s') {
        let secs: u64 = secs.parse().context("Invalid seconds in duration")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins: u64 = mins.parse().context("Invalid minutes in duration")?;
        let secs = mins.checked_mul(60).context("Duration is too large")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(hours) = s.strip_suffix('h') {
        let hours: u64 = hours.parse().context("Invalid hours in duration")?;
        let secs = hours.checked_mul(3600).context("Duration is too large")?;
        Ok(Duration::from_secs(secs))
    } else {
        anyhow::bail!("Invalid duration format: {}", s)
    }
}

/// Parse a timeout; a zero duration is rejected
pub fn parse_timeout(s: &str) -> Result<Duration> {
    let timeout = parse_duration(s)?;
    if timeout.is_zero() {
        anyhow::bail!("Timeout must be greater than zero: {}", s.trim());
    }
    Ok(timeout)
}
