use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::threads::authorize;
use crate::threads::embeds::{last_pass_description, settings_description};
use warden_core::{Context, Error};
use warden_database::impls::containers::container_ids;
use warden_database::impls::exemptions::exempt_thread_ids;
use warden_database::impls::passes::last_pass;
use warden_database::impls::thread_settings::get_thread_settings;
use warden_lifecycle::schedule::seconds_until_due;
use warden_utils::embed::titled_embed;
use warden_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "threadstatus",
    desc: "Show lifecycle settings and the last scan result.",
    category: "threads",
    usage: "!threadstatus",
};

/// Show lifecycle settings and the last scan result.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn threadstatus(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_THREADS).await? else {
        return Ok(());
    };

    let db = &ctx.data().db;
    let settings = get_thread_settings(db, guild_id.get()).await?;
    let containers = container_ids(db, guild_id.get()).await?;
    let exempt = exempt_thread_ids(db, guild_id.get()).await?;
    let last = last_pass(db, guild_id.get()).await?;

    let now = now_unix_secs();
    let wait = seconds_until_due(
        last.map(|record| record.finished_at),
        settings.scan_interval_minutes,
        now,
    );
    let next_due_at = i64::try_from(now.saturating_add(wait)).unwrap_or(i64::MAX);

    let embed = titled_embed(
        "Thread Lifecycle Status",
        settings_description(&settings, containers.len(), exempt.len()),
    )
    .field(
        "Last Scan",
        last_pass_description(last.as_ref(), next_due_at),
        false,
    )
    .footer(serenity::CreateEmbedFooter::new(format!(
        "Closure marker: \"{}\"",
        ctx.data().lifecycle_config.marker.phrase()
    )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
