/// Summary of the most recent applied lifecycle pass for a guild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecyclePassRecord {
    pub guild_id: u64,
    pub finished_at: u64,
    pub inspected: u64,
    pub reopened: u64,
    pub deleted: u64,
    pub failed: u64,
}
