//! Time zone helpers for stamping bars.
//!
//! Daily chart records only carry a calendar date. The normalizer pins each
//! date to a fixed local time of day in a [`BarZone`] and converts the result
//! to UTC. [`from_local_with_policy`] resolves the two DST edge cases:
//!
//! - Ambiguous local times happen during "fall back" when a wall time occurs twice.
//! - Nonexistent local times happen during "spring forward" when a wall time is skipped.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TzError {
    #[error("unknown time zone: {0}")]
    UnknownZone(String),

    #[error("ambiguous local time: {0}")]
    Ambiguous(NaiveDateTime),

    #[error("nonexistent local time: {0}")]
    Nonexistent(NaiveDateTime),
}

/// Policy for handling DST edge cases when converting local naive timestamps to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DstPolicy {
    /// Error on ambiguous or nonexistent local times.
    Strict,
    /// Ambiguous: pick the earlier instant. Nonexistent: error.
    PreferEarliest,
    /// Ambiguous: pick the later instant. Nonexistent: error.
    PreferLatest,
    /// Ambiguous: pick the earlier instant. Nonexistent: step forward one
    /// minute at a time until a valid instant is found (capped at 2 hours).
    ShiftForward,
}

/// Convert a naive local timestamp in `zone` to UTC according to `policy`.
pub fn from_local_with_policy<Z: TimeZone>(
    zone: &Z,
    naive: NaiveDateTime,
    policy: DstPolicy,
) -> Result<DateTime<Utc>, TzError> {
    use chrono::offset::LocalResult::*;
    match zone.from_local_datetime(&naive) {
        Single(dt) => Ok(dt.with_timezone(&Utc)),
        Ambiguous(a, b) => match policy {
            DstPolicy::PreferEarliest | DstPolicy::ShiftForward => Ok(a.with_timezone(&Utc)),
            DstPolicy::PreferLatest => Ok(b.with_timezone(&Utc)),
            DstPolicy::Strict => Err(TzError::Ambiguous(naive)),
        },
        None => match policy {
            DstPolicy::ShiftForward => {
                let mut t = naive;
                for _ in 0..120 {
                    t += TimeDelta::minutes(1);
                    if let Single(dt) = zone.from_local_datetime(&t) {
                        return Ok(dt.with_timezone(&Utc));
                    }
                }
                Err(TzError::Nonexistent(naive))
            }
            _ => Err(TzError::Nonexistent(naive)),
        },
    }
}

/// Zone in which bar dates are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarZone {
    /// The zone of the machine running the process.
    #[default]
    SystemLocal,
    /// An IANA zone such as `"America/New_York"`.
    Named(Tz),
}

impl BarZone {
    pub fn parse(name: &str) -> Result<Self, TzError> {
        name.trim()
            .parse::<Tz>()
            .map(BarZone::Named)
            .map_err(|_| TzError::UnknownZone(name.to_string()))
    }

    pub fn to_utc(&self, naive: NaiveDateTime, policy: DstPolicy) -> Result<DateTime<Utc>, TzError> {
        match self {
            BarZone::SystemLocal => from_local_with_policy(&chrono::Local, naive, policy),
            BarZone::Named(tz) => from_local_with_policy(tz, naive, policy),
        }
    }

    /// Wall-clock time of `ts` in this zone.
    pub fn naive_local(&self, ts: DateTime<Utc>) -> NaiveDateTime {
        match self {
            BarZone::SystemLocal => ts.with_timezone(&chrono::Local).naive_local(),
            BarZone::Named(tz) => ts.with_timezone(tz).naive_local(),
        }
    }
}
