use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::CommandMeta;
use crate::threads::authorize;
use warden_core::{Context, Error};
use warden_database::impls::exemptions::{
    add_exemption, is_exempt, list_exemptions, remove_exemption,
};
use warden_utils::formatting::{channel_mention, chunk_lines, relative_timestamp, user_mention};
use warden_utils::pagination::{PageStyle, paginate_embed_pages};
use warden_utils::parse::parse_channel_id;

pub const META: CommandMeta = CommandMeta {
    name: "exempt",
    desc: "Keep specific threads open and never delete them.",
    category: "threads",
    usage: "!exempt <add|remove|check> [thread] | !exempt list",
};

const EXEMPTIONS_PER_PAGE: usize = 15;

/// Keep specific threads open and never delete them.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Threads",
    subcommands("add", "remove", "list", "check")
)]
pub async fn exempt(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(format!("Usage: `{}`", META.usage)).await?;
    Ok(())
}

/// Exempt a thread (defaults to the current one).
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Thread mention or id"] thread: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_THREADS).await? else {
        return Ok(());
    };
    let Some(thread_id) = target_thread(ctx, thread.as_deref()).await? else {
        return Ok(());
    };

    if !is_guild_thread(ctx, guild_id, thread_id).await {
        ctx.say(format!(
            "{} is not a thread in this server.",
            channel_mention(thread_id)
        ))
        .await?;
        return Ok(());
    }

    let added = add_exemption(&ctx.data().db, guild_id.get(), thread_id, ctx.author().id.get()).await?;
    let message = if added {
        format!(
            "{} is now exempt. It will be kept open and never deleted.",
            channel_mention(thread_id)
        )
    } else {
        format!("{} is already exempt.", channel_mention(thread_id))
    };
    ctx.say(message).await?;
    Ok(())
}

/// Remove a thread's exemption (defaults to the current one).
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Thread mention or id"] thread: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_THREADS).await? else {
        return Ok(());
    };
    let Some(thread_id) = target_thread(ctx, thread.as_deref()).await? else {
        return Ok(());
    };

    let message = if remove_exemption(&ctx.data().db, guild_id.get(), thread_id).await? {
        format!(
            "{} is no longer exempt and follows the normal lifecycle.",
            channel_mention(thread_id)
        )
    } else {
        format!("{} was not exempt.", channel_mention(thread_id))
    };
    ctx.say(message).await?;
    Ok(())
}

/// Check whether a thread is exempt (defaults to the current one).
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn check(
    ctx: Context<'_>,
    #[description = "Thread mention or id"] thread: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_THREADS).await? else {
        return Ok(());
    };
    let Some(thread_id) = target_thread(ctx, thread.as_deref()).await? else {
        return Ok(());
    };

    let message = if is_exempt(&ctx.data().db, guild_id.get(), thread_id).await? {
        format!("{} is exempt.", channel_mention(thread_id))
    } else {
        format!("{} is not exempt.", channel_mention(thread_id))
    };
    ctx.say(message).await?;
    Ok(())
}

/// List exempt threads.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_THREADS).await? else {
        return Ok(());
    };

    let exemptions = list_exemptions(&ctx.data().db, guild_id.get()).await?;
    if exemptions.is_empty() {
        ctx.say("No threads are exempt.").await?;
        return Ok(());
    }

    let lines: Vec<String> = exemptions
        .iter()
        .map(|entry| {
            format!(
                "{} by {} {}",
                channel_mention(entry.thread_id),
                user_mention(entry.exempted_by),
                relative_timestamp(i64::try_from(entry.exempted_at).unwrap_or(i64::MAX))
            )
        })
        .collect();

    let pages = chunk_lines(&lines, EXEMPTIONS_PER_PAGE, 4_000);
    paginate_embed_pages(ctx, PageStyle::new("Exempt Threads"), &pages).await?;
    Ok(())
}

/// Explicit thread argument, else the channel the command runs in.
async fn target_thread(ctx: Context<'_>, raw: Option<&str>) -> Result<Option<u64>, Error> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(Some(ctx.channel_id().get())),
        Some(raw) => match parse_channel_id(raw) {
            Some(thread_id) => Ok(Some(thread_id)),
            None => {
                ctx.say("Provide a valid thread mention/id.").await?;
                Ok(None)
            }
        },
    }
}

async fn is_guild_thread(ctx: Context<'_>, guild_id: serenity::GuildId, thread_id: u64) -> bool {
    match serenity::ChannelId::new(thread_id).to_channel(ctx.http()).await {
        Ok(channel) => channel
            .guild()
            .is_some_and(|channel| channel.guild_id == guild_id && channel.thread_metadata.is_some()),
        Err(source) => {
            debug!(?source, thread_id, "thread lookup failed");
            false
        }
    }
}
