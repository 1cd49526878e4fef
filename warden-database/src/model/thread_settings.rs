use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_SCAN_INTERVAL_MINUTES: u64 = 60;
pub const DEFAULT_DELETE_DELAY_DAYS: u64 = 7;
/// One minute up to one week.
pub const SCAN_INTERVAL_RANGE: RangeInclusive<u64> = 1..=10_080;
pub const DELETE_DELAY_RANGE: RangeInclusive<u64> = 0..=365;

/// Per-guild lifecycle settings. Guilds without a stored row use the
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSettings {
    pub guild_id: u64,
    pub scan_interval_minutes: u64,
    pub delete_delay_days: u64,
    pub log_channel_id: Option<u64>,
}

impl ThreadSettings {
    pub fn defaults(guild_id: u64) -> Self {
        Self {
            guild_id,
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
            delete_delay_days: DEFAULT_DELETE_DELAY_DAYS,
            log_channel_id: None,
        }
    }

    /// Build settings from stored values, clamping anything out of range.
    pub fn from_stored(
        guild_id: u64,
        scan_interval_minutes: i64,
        delete_delay_days: i64,
        log_channel_id: Option<u64>,
    ) -> Self {
        let interval = clamp_stored(
            scan_interval_minutes,
            &SCAN_INTERVAL_RANGE,
            guild_id,
            "scan_interval_minutes",
        );
        let delay = clamp_stored(
            delete_delay_days,
            &DELETE_DELAY_RANGE,
            guild_id,
            "delete_delay_days",
        );

        Self {
            guild_id,
            scan_interval_minutes: interval,
            delete_delay_days: delay,
            log_channel_id,
        }
    }
}

fn clamp_stored(raw: i64, range: &RangeInclusive<u64>, guild_id: u64, column: &str) -> u64 {
    let value = u64::try_from(raw).unwrap_or(*range.start());
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value || raw < 0 {
        warn!(guild_id, column, raw, clamped, "stored setting out of range; clamped");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DELETE_DELAY_DAYS, DEFAULT_SCAN_INTERVAL_MINUTES, ThreadSettings};

    #[test]
    fn defaults_match_constants() {
        let settings = ThreadSettings::defaults(9);
        assert_eq!(settings.scan_interval_minutes, DEFAULT_SCAN_INTERVAL_MINUTES);
        assert_eq!(settings.delete_delay_days, DEFAULT_DELETE_DELAY_DAYS);
        assert_eq!(settings.log_channel_id, None);
    }

    #[test]
    fn stored_values_are_clamped() {
        let settings = ThreadSettings::from_stored(9, 0, 9_999, Some(5));
        assert_eq!(settings.scan_interval_minutes, 1);
        assert_eq!(settings.delete_delay_days, 365);

        let negative = ThreadSettings::from_stored(9, -5, -1, None);
        assert_eq!(negative.scan_interval_minutes, 1);
        assert_eq!(negative.delete_delay_days, 0);
    }
}
