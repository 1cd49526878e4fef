use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use warden_core::{Data, LifecycleSignal};

/// Forward deletions in the target guild so the coordinator can drop any
/// exemption row for the thread. Waits for queue space rather than dropping
/// the deletion.
pub async fn handle_thread_delete(data: &Data, thread: &serenity::PartialGuildChannel) {
    if thread.guild_id.get() != data.guild_id {
        return;
    }

    debug!(thread_id = thread.id.get(), "thread deleted");
    data.lifecycle
        .send(LifecycleSignal::ThreadDeleted(thread.id.get()))
        .await;
}

pub fn handle_ready(ready: &serenity::Ready) {
    info!(
        user = %ready.user.name,
        guilds = ready.guilds.len(),
        shard = ?ready.shard.as_ref().map(|shard| shard.id.0),
        "gateway session ready"
    );
}
