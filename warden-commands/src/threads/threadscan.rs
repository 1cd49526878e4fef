use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::threads::authorize;
use crate::threads::embeds::no_containers_message;
use warden_core::{Context, Error, LifecycleSignal};
use warden_database::impls::containers::container_ids;
use warden_utils::confirmation::{Confirmation, confirm};
use warden_utils::embed::titled_embed;

pub const META: CommandMeta = CommandMeta {
    name: "threadscan",
    desc: "Run a thread scan now instead of waiting for the interval.",
    category: "threads",
    usage: "!threadscan",
};

/// Run a thread scan now instead of waiting for the interval.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn threadscan(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_THREADS).await? else {
        return Ok(());
    };

    if container_ids(&ctx.data().db, guild_id.get()).await?.is_empty() {
        ctx.say(no_containers_message()).await?;
        return Ok(());
    }

    let prompt = titled_embed(
        "Run Thread Scan",
        "This reopens stale threads and deletes closed threads past their delay. \
         Use `!threadpreview` to see what would change first.",
    );

    let lifecycle = ctx.data().lifecycle.clone();
    confirm(ctx, prompt, "Scan now", |answer| match answer {
        Confirmation::Confirmed if lifecycle.notify(LifecycleSignal::RunNow) => {
            "Scan queued. Results go to the log channel if one is set.".to_owned()
        }
        Confirmation::Confirmed => "The scanner is not running; try again shortly.".to_owned(),
        Confirmation::Declined => "Scan cancelled.".to_owned(),
        Confirmation::TimedOut => "Scan prompt timed out.".to_owned(),
    })
    .await?;

    Ok(())
}
