use serde::{Deserialize, Serialize};

/// A text or forum channel whose archived threads are scanned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredContainer {
    pub guild_id: u64,
    pub channel_id: u64,
    pub added_by: u64,
    pub added_at: u64,
}
