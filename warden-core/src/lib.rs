pub mod lifecycle;

use std::sync::Arc;

use warden_database::Database;
use warden_lifecycle::LifecycleConfig;

pub use lifecycle::{LifecycleHandle, LifecycleSignal};

pub type Error = anyhow::Error;

#[derive(Clone, Debug)]
pub struct Data {
    /// The single guild this process manages.
    pub guild_id: u64,
    pub db: Database,
    pub lifecycle_config: Arc<LifecycleConfig>,
    pub lifecycle: LifecycleHandle,
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
