#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExemptedThread {
    pub guild_id: u64,
    pub thread_id: u64,
    pub exempted_by: u64,
    pub exempted_at: u64,
}
