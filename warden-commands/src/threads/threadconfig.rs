use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::threads::authorize;
use crate::threads::embeds::settings_description;
use warden_core::{Context, Error, LifecycleSignal};
use warden_database::impls::containers::container_ids;
use warden_database::impls::exemptions::exempt_thread_ids;
use warden_database::impls::thread_settings::{
    clear_log_channel, get_thread_settings, set_delete_delay, set_log_channel, set_scan_interval,
};
use warden_database::model::thread_settings::{DELETE_DELAY_RANGE, SCAN_INTERVAL_RANGE};
use warden_utils::embed::titled_embed;
use warden_utils::formatting::{channel_mention, format_day_count, format_interval_minutes};
use warden_utils::parse::{parse_channel_id, parse_delay_days, parse_interval_minutes};

pub const META: CommandMeta = CommandMeta {
    name: "threadconfig",
    desc: "View or change the thread lifecycle settings.",
    category: "threads",
    usage: "!threadconfig [interval <minutes>|delay <days>|logchannel <#channel|clear>]",
};

/// View or change the thread lifecycle settings.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Threads",
    subcommands("interval", "delay", "logchannel")
)]
pub async fn threadconfig(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_GUILD).await? else {
        return Ok(());
    };

    let db = &ctx.data().db;
    let settings = get_thread_settings(db, guild_id.get()).await?;
    let containers = container_ids(db, guild_id.get()).await?;
    let exempt = exempt_thread_ids(db, guild_id.get()).await?;

    let embed = titled_embed(
        "Thread Lifecycle Config",
        settings_description(&settings, containers.len(), exempt.len()),
    )
    .footer(serenity::CreateEmbedFooter::new(
        "Subcommands: interval, delay, logchannel",
    ));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Set how often threads are scanned.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn interval(
    ctx: Context<'_>,
    #[description = "Minutes between scans, or a duration like 2h"] minutes: String,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_GUILD).await? else {
        return Ok(());
    };

    let Some(minutes) =
        parse_interval_minutes(&minutes).filter(|minutes| SCAN_INTERVAL_RANGE.contains(minutes))
    else {
        ctx.say(format!(
            "Interval must be between {} and {} minutes.",
            SCAN_INTERVAL_RANGE.start(),
            SCAN_INTERVAL_RANGE.end()
        ))
        .await?;
        return Ok(());
    };

    set_scan_interval(&ctx.data().db, guild_id.get(), minutes).await?;
    ctx.data().lifecycle.notify(LifecycleSignal::SettingsChanged);

    ctx.say(format!(
        "Threads will now be scanned **{}**.",
        format_interval_minutes(minutes).to_lowercase()
    ))
    .await?;
    Ok(())
}

/// Set how long closed threads are kept before deletion.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn delay(
    ctx: Context<'_>,
    #[description = "Days to keep closed threads (0 deletes on the next scan)"] days: String,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_GUILD).await? else {
        return Ok(());
    };

    let Some(days) = parse_delay_days(&days).filter(|days| DELETE_DELAY_RANGE.contains(days)) else {
        ctx.say(format!(
            "Delay must be a whole number of days between {} and {}.",
            DELETE_DELAY_RANGE.start(),
            DELETE_DELAY_RANGE.end()
        ))
        .await?;
        return Ok(());
    };

    set_delete_delay(&ctx.data().db, guild_id.get(), days).await?;
    ctx.data().lifecycle.notify(LifecycleSignal::SettingsChanged);

    let message = if days == 0 {
        "Closed threads will be deleted on the next scan.".to_owned()
    } else {
        format!(
            "Closed threads will be deleted **{}** after closing.",
            format_day_count(days)
        )
    };
    ctx.say(message).await?;
    Ok(())
}

/// Set, view or clear the lifecycle log channel.
#[poise::command(prefix_command, slash_command, category = "Threads")]
pub async fn logchannel(
    ctx: Context<'_>,
    #[description = "Channel mention/id, or 'clear'"]
    #[rest]
    input: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = authorize(ctx, serenity::Permissions::MANAGE_GUILD).await? else {
        return Ok(());
    };

    let db = &ctx.data().db;

    let Some(input) = input
        .as_deref()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
    else {
        let settings = get_thread_settings(db, guild_id.get()).await?;
        match settings.log_channel_id {
            Some(channel_id) => {
                ctx.say(format!("Current log channel: {}", channel_mention(channel_id)))
                    .await?
            }
            None => ctx.say("No log channel configured.").await?,
        };
        return Ok(());
    };

    if input.eq_ignore_ascii_case("clear") {
        clear_log_channel(db, guild_id.get()).await?;
        ctx.data().lifecycle.notify(LifecycleSignal::SettingsChanged);
        ctx.say("Log channel cleared.").await?;
        return Ok(());
    }

    let Some(channel_id) = parse_channel_id(input) else {
        ctx.say("Provide a valid channel mention/id, or `clear`.")
            .await?;
        return Ok(());
    };

    set_log_channel(db, guild_id.get(), channel_id).await?;
    ctx.data().lifecycle.notify(LifecycleSignal::SettingsChanged);
    ctx.say(format!("Log channel set to {}.", channel_mention(channel_id)))
        .await?;
    Ok(())
}
