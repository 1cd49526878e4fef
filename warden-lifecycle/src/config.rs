use std::time::Duration;

use anyhow::Context as _;

use crate::detector::ClosedMarker;

pub const DEFAULT_CLOSED_MARKER: &str = "this thread has been closed";
/// Discord returns at most 100 messages per history request.
pub const MAX_HISTORY_LIMIT: u8 = 100;
pub const DEFAULT_SCAN_HISTORY_LIMIT: u8 = 100;
pub const DEFAULT_PREVIEW_HISTORY_LIMIT: u8 = 20;
pub const DEFAULT_SCHEDULE_CHECK: Duration = Duration::from_secs(60);

/// Process-wide scanner configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct LifecycleConfig {
    pub marker: ClosedMarker,
    pub scan_history_limit: u8,
    pub preview_history_limit: u8,
    pub schedule_check: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            marker: ClosedMarker::default(),
            scan_history_limit: DEFAULT_SCAN_HISTORY_LIMIT,
            preview_history_limit: DEFAULT_PREVIEW_HISTORY_LIMIT,
            schedule_check: DEFAULT_SCHEDULE_CHECK,
        }
    }
}

impl LifecycleConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from a key lookup (environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let marker = match lookup("CLOSED_MARKER") {
            Some(raw) => ClosedMarker::new(raw).context("CLOSED_MARKER must not be blank")?,
            None => defaults.marker,
        };

        let scan_history_limit = history_limit(
            lookup("SCAN_HISTORY_LIMIT"),
            defaults.scan_history_limit,
            "SCAN_HISTORY_LIMIT",
        )?;
        let preview_history_limit = history_limit(
            lookup("PREVIEW_HISTORY_LIMIT"),
            defaults.preview_history_limit,
            "PREVIEW_HISTORY_LIMIT",
        )?;

        let schedule_check = match lookup("SCHEDULE_CHECK_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("SCHEDULE_CHECK_SECS is not a number: `{raw}`"))?;
                Duration::from_secs(secs.max(1))
            }
            None => defaults.schedule_check,
        };

        Ok(Self {
            marker,
            scan_history_limit,
            preview_history_limit,
            schedule_check,
        })
    }
}

fn history_limit(raw: Option<String>, default: u8, key: &str) -> anyhow::Result<u8> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} is not a number: `{raw}`"))?;

    Ok(value.clamp(1, u64::from(MAX_HISTORY_LIMIT)) as u8)
}
