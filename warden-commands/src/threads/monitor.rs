use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::CommandMeta;
use crate::threads::authorize;
use crate::threads::embeds::no_containers_message;
use warden_core::{Context, Error, LifecycleSignal};
use warden_database::impls::containers::{add_container, list_containers, remove_container};
use warden_utils::formatting::{channel_mention, chunk_lines, relative_timestamp, user_mention};
use warden_utils::pagination::{PageStyle, paginate_embed_pages};
use warden_utils::parse::parse_channel_id;

pub const META: CommandMeta = CommandMeta {
    name: "monitor",
    desc: "Manage the channels whose threads are scanned.",
    category: "threads",
    usage: "!monitor <add|remove|list> [#channel]",
};

const CONTAINERS_PER_PAGE: usize = 15;

/// Manage the channels whose threads are scanned.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Threads",
    subcommands("add", "remove", "list")
)]
pub async fn monitor(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(format!("Usage: `{}`", META.usage)).await?;
    Ok(())
}

/// Start scanning threads under a channel.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Text or forum channel"] channel: String,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_GUILD).await? else {
        return Ok(());
    };

    let Some(channel_id) = parse_channel_id(&channel) else {
        ctx.say("Provide a valid channel mention/id.").await?;
        return Ok(());
    };

    if !is_thread_container(ctx, guild_id, channel_id).await {
        ctx.say(format!(
            "{} is not a text, announcement or forum channel in this server.",
            channel_mention(channel_id)
        ))
        .await?;
        return Ok(());
    }

    let added = add_container(&ctx.data().db, guild_id.get(), channel_id, ctx.author().id.get()).await?;
    if added {
        ctx.data().lifecycle.notify(LifecycleSignal::SettingsChanged);
        ctx.say(format!(
            "Now monitoring threads in {}.",
            channel_mention(channel_id)
        ))
        .await?;
    } else {
        ctx.say(format!("{} is already monitored.", channel_mention(channel_id)))
            .await?;
    }

    Ok(())
}

/// Stop scanning threads under a channel.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Channel mention or id"] channel: String,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_GUILD).await? else {
        return Ok(());
    };

    let Some(channel_id) = parse_channel_id(&channel) else {
        ctx.say("Provide a valid channel mention/id.").await?;
        return Ok(());
    };

    if remove_container(&ctx.data().db, guild_id.get(), channel_id).await? {
        ctx.data().lifecycle.notify(LifecycleSignal::SettingsChanged);
        ctx.say(format!(
            "Stopped monitoring {}.",
            channel_mention(channel_id)
        ))
        .await?;
    } else {
        ctx.say(format!("{} was not monitored.", channel_mention(channel_id)))
            .await?;
    }

    Ok(())
}

/// List monitored channels.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_GUILD).await? else {
        return Ok(());
    };

    let containers = list_containers(&ctx.data().db, guild_id.get()).await?;
    if containers.is_empty() {
        ctx.say(no_containers_message()).await?;
        return Ok(());
    }

    let lines: Vec<String> = containers
        .iter()
        .map(|container| {
            format!(
                "{} added by {} {}",
                channel_mention(container.channel_id),
                user_mention(container.added_by),
                relative_timestamp(i64::try_from(container.added_at).unwrap_or(i64::MAX))
            )
        })
        .collect();

    let pages = chunk_lines(&lines, CONTAINERS_PER_PAGE, 4_000);
    paginate_embed_pages(ctx, PageStyle::new("Monitored Channels"), &pages).await?;
    Ok(())
}

async fn is_thread_container(ctx: Context<'_>, guild_id: serenity::GuildId, channel_id: u64) -> bool {
    let channel = match serenity::ChannelId::new(channel_id).to_channel(ctx.http()).await {
        Ok(channel) => channel,
        Err(source) => {
            debug!(?source, channel_id, "channel lookup failed");
            return false;
        }
    };

    channel.guild().is_some_and(|channel| {
        channel.guild_id == guild_id
            && matches!(
                channel.kind,
                serenity::ChannelType::Text | serenity::ChannelType::News | serenity::ChannelType::Forum
            )
    })
}
