//! Clock corrections applied to capture times.
//!
//! `--time-adjust` takes `HH:MM:SS`; a leading `-` on the hours negates the whole offset, so
//! `-01:30:00` means ninety minutes earlier. `--day-adjust` takes a signed whole number of days.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDateTime, TimeDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeAdjustment {
    offset: TimeDelta,
}

impl TimeAdjustment {
    pub fn none() -> Self {
        Self::default()
    }

    /// Combine an optional `HH:MM:SS` offset with an optional day count.
    pub fn new(time: Option<&str>, days: Option<i64>) -> Result<Self> {
        let mut offset = TimeDelta::zero();
        if let Some(t) = time {
            offset = parse_time_delta(t)?;
        }
        if let Some(d) = days {
            let shift = TimeDelta::try_days(d)
                .with_context(|| format!("day adjustment out of range: {d}"))?;
            offset = offset
                .checked_add(&shift)
                .with_context(|| format!("combined adjustment out of range: {d} days"))?;
        }
        Ok(Self { offset })
    }

    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    pub fn is_zero(&self) -> bool {
        self.offset.is_zero()
    }

    /// Shift `ts`; values that would leave chrono's range are returned unchanged.
    pub fn apply(&self, ts: NaiveDateTime) -> NaiveDateTime {
        ts.checked_add_signed(self.offset).unwrap_or(ts)
    }
}

/// Parse `[-]HH:MM:SS`.
pub fn parse_time_delta(s: &str) -> Result<TimeDelta> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 3 {
        bail!("invalid time adjustment '{s}': expected HH:MM:SS");
    }
    let negate = parts[0].starts_with('-');
    let hours: i64 = parts[0]
        .parse()
        .with_context(|| format!("invalid hours in time adjustment '{s}'"))?;
    let minutes: i64 = parts[1]
        .parse()
        .with_context(|| format!("invalid minutes in time adjustment '{s}'"))?;
    let seconds: i64 = parts[2]
        .parse()
        .with_context(|| format!("invalid seconds in time adjustment '{s}'"))?;
    if minutes < 0 || seconds < 0 {
        bail!("invalid time adjustment '{s}': only the hours may carry a sign");
    }
    let (minutes, seconds) = if negate { (-minutes, -seconds) } else { (minutes, seconds) };
    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|t| t.checked_add(seconds))
        .and_then(TimeDelta::try_seconds)
        .with_context(|| format!("time adjustment out of range: '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn positive_offset() {
        assert_eq!(
            parse_time_delta("01:30:15").unwrap(),
            TimeDelta::seconds(3600 + 30 * 60 + 15)
        );
    }

    #[test]
    fn leading_minus_negates_everything() {
        assert_eq!(
            parse_time_delta("-01:30:00").unwrap(),
            TimeDelta::seconds(-(3600 + 30 * 60))
        );
        assert_eq!(parse_time_delta("-00:00:10").unwrap(), TimeDelta::seconds(-10));
    }

    #[test]
    fn malformed_offsets_are_rejected() {
        assert!(parse_time_delta("01:30").is_err());
        assert!(parse_time_delta("aa:00:00").is_err());
        assert!(parse_time_delta("01:-5:00").is_err());
    }

    #[test]
    fn days_and_time_combine() {
        let adj = TimeAdjustment::new(Some("02:00:00"), Some(-1)).unwrap();
        assert_eq!(adj.apply(ts("2024-01-15 12:00:00")), ts("2024-01-14 14:00:00"));
        assert!(TimeAdjustment::none().is_zero());
    }
}
