//! Source time zone for zone-less timestamps.
//!
//! `Value::Timestamp` holds a wall-clock reading with no zone attached. On
//! output it is interpreted in a [`SourceZone`] and converted to UTC. The zone
//! travels in [`JsonOptions`](crate::JsonOptions); the process-wide default is
//! fixed once at start-up, either explicitly with [`set_default_time_zone`] or
//! from the `MODELJSON_TZ` environment variable.
//!
//! # Environment Variables
//!
//! - `MODELJSON_TZ=local|utc|+HH:MM|-HHMM|+HH` - default source zone

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{FixedOffset, Local, NaiveDateTime, TimeZone};
use modeljson_core::{ConfigError, Error, Result};

/// Environment variable read by [`SourceZone::from_env`].
pub const TZ_ENV_VAR: &str = "MODELJSON_TZ";

static DEFAULT_ZONE: OnceLock<SourceZone> = OnceLock::new();

/// The zone a naive timestamp was recorded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceZone {
    /// The operating system's local zone, DST rules included.
    #[default]
    Local,
    /// Timestamps are already UTC.
    Utc,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl SourceZone {
    /// A fixed zone `seconds` east of UTC, if the offset is in range.
    pub fn east(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(SourceZone::Fixed)
    }

    /// Convert a wall-clock reading in this zone to the UTC wall clock.
    ///
    /// An ambiguous local time (DST fold) resolves to the earlier instant. A
    /// local time that does not exist (DST gap) is returned unchanged.
    pub fn to_utc(self, local: NaiveDateTime) -> NaiveDateTime {
        match self {
            SourceZone::Local => wall_clock_to_utc(&Local, local, self),
            SourceZone::Utc => local,
            SourceZone::Fixed(offset) => wall_clock_to_utc(&offset, local, self),
        }
    }

    /// Read the zone from `MODELJSON_TZ`, defaulting to [`SourceZone::Local`].
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(env::var(TZ_ENV_VAR).ok().as_deref())
    }

    fn from_env_value(raw: Option<&str>) -> Result<Self> {
        match raw {
            Some(raw) if !raw.trim().is_empty() => raw.parse(),
            _ => Ok(SourceZone::Local),
        }
    }
}

fn wall_clock_to_utc<Tz: TimeZone>(
    zone: &Tz,
    local: NaiveDateTime,
    label: SourceZone,
) -> NaiveDateTime {
    match zone.from_local_datetime(&local).earliest() {
        Some(dt) => dt.naive_utc(),
        None => {
            tracing::warn!(
                zone = %label,
                timestamp = %local,
                "Local time does not exist in source zone; rendering it unconverted"
            );
            local
        }
    }
}

impl fmt::Display for SourceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceZone::Local => write!(f, "local"),
            SourceZone::Utc => write!(f, "UTC"),
            SourceZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl From<FixedOffset> for SourceZone {
    fn from(offset: FixedOffset) -> Self {
        SourceZone::Fixed(offset)
    }
}

impl FromStr for SourceZone {
    type Err = Error;

    /// Accepts `local`, `utc`, `z`, and offsets `+HH:MM`, `-HHMM`, `+HH`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "local" => return Ok(SourceZone::Local),
            "utc" | "z" => return Ok(SourceZone::Utc),
            _ => {}
        }
        parse_offset(s)
            .and_then(FixedOffset::east_opt)
            .map(SourceZone::Fixed)
            .ok_or_else(|| Error::Config(ConfigError::new(format!("invalid time zone '{s}'"))))
    }
}

/// Parse `+HH:MM`, `-HHMM` or `+HH` into seconds east of UTC.
fn parse_offset(s: &str) -> Option<i32> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (
            digits[..2].parse::<i32>().ok()?,
            digits[2..].parse::<i32>().ok()?,
        ),
        _ => return None,
    };
    // a colon is only allowed as `HH:MM`
    if rest.contains(':') && (rest.len() != 5 || rest.as_bytes()[2] != b':') {
        return None;
    }
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

/// Set the process-wide default source zone.
///
/// Only the first call, and only if it happens before the default was first
/// read, takes effect. Returns whether this call set the zone.
pub fn set_default_time_zone(zone: SourceZone) -> bool {
    let accepted = DEFAULT_ZONE.set(zone).is_ok();
    if !accepted {
        tracing::debug!(zone = %zone, "Default time zone already fixed; ignoring");
    }
    accepted
}

/// The process-wide default source zone.
///
/// Falls back to `MODELJSON_TZ`, then to [`SourceZone::Local`] when the
/// variable is unset or invalid.
pub fn default_time_zone() -> SourceZone {
    *DEFAULT_ZONE.get_or_init(|| {
        SourceZone::from_env().unwrap_or_else(|err| {
            tracing::warn!(error = %err, var = TZ_ENV_VAR, "Falling back to local time zone");
            SourceZone::Local
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{LocalResult, NaiveDate, Timelike};

    /// UTC+1, except 02:00-02:59 local is skipped and 01:00-01:59 happens twice
    /// (once at UTC+2).
    #[derive(Debug, Clone, Copy)]
    struct Shifting;

    fn hours(h: i32) -> FixedOffset {
        FixedOffset::east_opt(h * 3600).unwrap()
    }

    impl TimeZone for Shifting {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Shifting
        }

        fn offset_from_local_date(&self, _: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::Single(hours(1))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            match local.hour() {
                1 => LocalResult::Ambiguous(hours(2), hours(1)),
                2 => LocalResult::None,
                _ => LocalResult::Single(hours(1)),
            }
        }

        fn offset_from_utc_date(&self, _: &NaiveDate) -> FixedOffset {
            hours(1)
        }

        fn offset_from_utc_datetime(&self, _: &NaiveDateTime) -> FixedOffset {
            hours(1)
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_names_and_offsets() {
        assert_eq!("local".parse::<SourceZone>().unwrap(), SourceZone::Local);
        assert_eq!(" UTC ".parse::<SourceZone>().unwrap(), SourceZone::Utc);
        assert_eq!("Z".parse::<SourceZone>().unwrap(), SourceZone::Utc);
        assert_eq!(
            "+05:30".parse::<SourceZone>().unwrap(),
            SourceZone::east(5 * 3600 + 30 * 60).unwrap()
        );
        assert_eq!(
            "-0800".parse::<SourceZone>().unwrap(),
            SourceZone::east(-8 * 3600).unwrap()
        );
        assert_eq!(
            "+02".parse::<SourceZone>().unwrap(),
            SourceZone::east(2 * 3600).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "mars", "+5", "+24:00", "+05:60", "05:00", "+0:500", "+05:3x"] {
            let err = bad.parse::<SourceZone>().unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{bad} should be rejected");
        }
    }

    #[test]
    fn fixed_offset_converts_to_utc() {
        let kyiv = SourceZone::east(2 * 3600).unwrap();
        assert_eq!(kyiv.to_utc(at(2024, 1, 1, 1, 30, 0)), at(2023, 12, 31, 23, 30, 0));

        let new_york = SourceZone::east(-5 * 3600).unwrap();
        assert_eq!(new_york.to_utc(at(2024, 1, 1, 20, 0, 0)), at(2024, 1, 2, 1, 0, 0));
    }

    #[test]
    fn utc_is_identity() {
        let t = at(1999, 12, 31, 23, 59, 59);
        assert_eq!(SourceZone::Utc.to_utc(t), t);
    }

    #[test]
    fn local_follows_the_system_zone() {
        for t in [at(2024, 1, 15, 12, 0, 0), at(2024, 7, 15, 12, 0, 0)] {
            let expected = Local
                .from_local_datetime(&t)
                .earliest()
                .map_or(t, |dt| dt.naive_utc());
            assert_eq!(SourceZone::Local.to_utc(t), expected);
        }
    }

    #[test]
    fn gap_is_left_unconverted() {
        let skipped = at(2024, 3, 31, 2, 30, 0);
        assert_eq!(wall_clock_to_utc(&Shifting, skipped, SourceZone::Local), skipped);
    }

    #[test]
    fn fold_takes_the_earlier_instant() {
        let twice = at(2024, 10, 27, 1, 30, 0);
        assert_eq!(
            wall_clock_to_utc(&Shifting, twice, SourceZone::Local),
            at(2024, 10, 26, 23, 30, 0)
        );
        assert_eq!(
            wall_clock_to_utc(&Shifting, at(2024, 10, 27, 4, 0, 0), SourceZone::Local),
            at(2024, 10, 27, 3, 0, 0)
        );
    }

    #[test]
    fn env_value() {
        assert_eq!(SourceZone::from_env_value(None).unwrap(), SourceZone::Local);
        assert_eq!(SourceZone::from_env_value(Some("  ")).unwrap(), SourceZone::Local);
        assert_eq!(SourceZone::from_env_value(Some("utc")).unwrap(), SourceZone::Utc);
        assert_eq!(
            SourceZone::from_env_value(Some("-03:00")).unwrap(),
            SourceZone::east(-3 * 3600).unwrap()
        );
        assert!(SourceZone::from_env_value(Some("moon")).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(SourceZone::Local.to_string(), "local");
        assert_eq!(SourceZone::Utc.to_string(), "UTC");
        assert_eq!(SourceZone::east(-3600).unwrap().to_string(), "-01:00");
    }
}
