use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::threads::authorize;
use crate::threads::dry_run_report;
use crate::threads::embeds::{no_containers_message, schedule_lines};
use warden_core::lifecycle::load_guild_snapshot;
use warden_core::{Context, Error};
use warden_utils::formatting::chunk_lines;
use warden_utils::pagination::{PageStyle, paginate_embed_pages};

pub const META: CommandMeta = CommandMeta {
    name: "threadschedule",
    desc: "List closed threads and when they will be deleted.",
    category: "threads",
    usage: "!threadschedule",
};

const ENTRIES_PER_PAGE: usize = 15;

/// List closed threads and when they will be deleted.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn threadschedule(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_THREADS).await? else {
        return Ok(());
    };

    let snapshot = load_guild_snapshot(&ctx.data().db, guild_id.get()).await?;
    if snapshot.containers.is_empty() {
        ctx.say(no_containers_message()).await?;
        return Ok(());
    }

    ctx.defer().await?;
    let report = dry_run_report(ctx, &snapshot, None).await;

    let lines = schedule_lines(&report);
    if lines.is_empty() {
        ctx.say("No closed threads are waiting for deletion.").await?;
        return Ok(());
    }

    let pages = chunk_lines(&lines, ENTRIES_PER_PAGE, 4_000);
    paginate_embed_pages(
        ctx,
        PageStyle::new("Deletion Schedule").note("Overdue threads go on the next scan"),
        &pages,
    )
    .await?;
    Ok(())
}
