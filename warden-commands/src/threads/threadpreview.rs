use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::threads::authorize;
use crate::threads::dry_run_report;
use crate::threads::embeds::{no_containers_message, preview_line};
use warden_core::lifecycle::load_guild_snapshot;
use warden_core::{Context, Error};
use warden_utils::embed::WARNING_EMBED_COLOR;
use warden_utils::formatting::{channel_mention, chunk_lines};
use warden_utils::pagination::{PageStyle, paginate_embed_pages};
use warden_utils::parse::parse_channel_id;

pub const META: CommandMeta = CommandMeta {
    name: "threadpreview",
    desc: "Show what the next scan would do, without changing anything.",
    category: "threads",
    usage: "!threadpreview [#channel]",
};

const VERDICTS_PER_PAGE: usize = 12;

/// Show what the next scan would do, without changing anything.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn threadpreview(
    ctx: Context<'_>,
    #[description = "Only preview this monitored channel"] channel: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_THREADS).await? else {
        return Ok(());
    };

    let snapshot = load_guild_snapshot(&ctx.data().db, guild_id.get()).await?;
    if snapshot.containers.is_empty() {
        ctx.say(no_containers_message()).await?;
        return Ok(());
    }

    let only_container = match channel.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        None => None,
        Some(raw) => {
            let Some(channel_id) = parse_channel_id(raw) else {
                ctx.say("Provide a valid channel mention/id.").await?;
                return Ok(());
            };
            if !snapshot.containers.contains(&channel_id) {
                ctx.say(format!(
                    "{} is not monitored. Add it with `!monitor add`.",
                    channel_mention(channel_id)
                ))
                .await?;
                return Ok(());
            }
            Some(channel_id)
        }
    };

    ctx.defer().await?;
    let report = dry_run_report(ctx, &snapshot, only_container).await;

    if report.verdicts.is_empty() && report.container_failures.is_empty() {
        ctx.say("No archived threads to review.").await?;
        return Ok(());
    }

    let lines: Vec<String> = report
        .verdicts
        .iter()
        .map(preview_line)
        .chain(report.container_failures.iter().map(|(container_id, kind)| {
            format!(
                "{} could not be listed ({})",
                channel_mention(*container_id),
                kind.label()
            )
        }))
        .collect();

    let note = format!(
        "Dry run • {} inspected, nothing was changed",
        report.inspected()
    );
    let mut style = PageStyle::new("Thread Lifecycle Preview").note(&note);
    if report.failed() > 0 {
        style = style.color(WARNING_EMBED_COLOR);
    }

    let pages = chunk_lines(&lines, VERDICTS_PER_PAGE, 4_000);
    paginate_embed_pages(ctx, style, &pages).await?;
    Ok(())
}
