mod events;
mod lifecycle;

use std::env;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;

use warden_core::{Data, Error, LifecycleHandle};
use warden_database::{CacheService, Database, MIGRATOR, connect_sqlite};
use warden_lifecycle::{LifecycleConfig, SerenityGateway};

use crate::lifecycle::{Coordinator, run_coordinator};

const DEFAULT_DATABASE_URL: &str = "sqlite://threadwarden.db";
const DEFAULT_REDIS_KEY_PREFIX: &str = "threadwarden:prod";
const SIGNAL_QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let token = env::var("DISCORD_TOKEN")?;
    let guild_id = env::var("DISCORD_GUILD_ID")?.parse::<u64>()?;
    anyhow::ensure!(guild_id != 0, "DISCORD_GUILD_ID must be a nonzero guild id");
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

    let lifecycle_config = Arc::new(LifecycleConfig::from_env()?);
    info!(
        marker = lifecycle_config.marker.phrase(),
        scan_history_limit = lifecycle_config.scan_history_limit,
        preview_history_limit = lifecycle_config.preview_history_limit,
        schedule_check_secs = lifecycle_config.schedule_check.as_secs(),
        "Lifecycle configuration loaded."
    );

    let db_pool = connect_sqlite(&database_url, 5).await?;
    info!(%database_url, "SQLite connection established.");

    let cache = build_cache().await;
    let db = Database::with_cache(db_pool, cache);

    let auto_run_migrations = env_bool("AUTO_RUN_MIGRATIONS", true);
    if auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let (lifecycle, signals) = LifecycleHandle::channel(SIGNAL_QUEUE_CAPACITY);

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: warden_commands::commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(warden_utils::COMMAND_PREFIX.to_string()),
                mention_as_prefix: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup({
            let db = db.clone();
            let lifecycle_config = lifecycle_config.clone();
            move |ctx, _ready, framework| {
                Box::pin(async move {
                    info!("Threadwarden is ready.");

                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        serenity::GuildId::new(guild_id),
                    )
                    .await?;

                    Ok(Data {
                        guild_id,
                        db,
                        lifecycle_config,
                        lifecycle,
                    })
                })
            }
        })
        .build();

    info!("Threadwarden is connecting...");

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    let coordinator = Coordinator::new(
        db,
        SerenityGateway::new(client.http.clone()),
        lifecycle_config,
        guild_id,
    );
    let coordinator_task = tokio::spawn(run_coordinator(
        coordinator,
        client.http.clone(),
        signals,
    ));

    let shard_manager = client.shard_manager.clone();
    let outcome = tokio::select! {
        result = client.start() => result.map_err(anyhow::Error::from),
        signal = tokio::signal::ctrl_c() => {
            if let Err(source) = signal {
                warn!(?source, "failed to listen for ctrl-c");
            }
            info!("Shutdown requested.");
            shard_manager.shutdown_all().await;
            Ok(())
        }
    };

    coordinator_task.abort();
    outcome
}

async fn build_cache() -> CacheService {
    let redis_enabled = env_bool("REDIS_ENABLED", false);
    let redis_key_prefix =
        env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| DEFAULT_REDIS_KEY_PREFIX.to_owned());

    let cache = if redis_enabled {
        match env::var("REDIS_URL") {
            Ok(redis_url) => match CacheService::redis(&redis_url, redis_key_prefix.clone()) {
                Ok(cache) => {
                    info!(key_prefix = %redis_key_prefix, "Redis cache enabled.");
                    cache
                }
                Err(err) => {
                    warn!(?err, key_prefix = %redis_key_prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
                    CacheService::disabled(redis_key_prefix.clone())
                }
            },
            Err(_) => {
                warn!(key_prefix = %redis_key_prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
                CacheService::disabled(redis_key_prefix.clone())
            }
        }
    } else {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        CacheService::disabled(redis_key_prefix.clone())
    };

    if cache.is_redis_enabled() {
        if let Err(err) = cache.ping().await {
            warn!(
                ?err,
                "Redis cache ping failed; cache operations will continue with fallback behavior."
            );
        } else {
            info!("Redis cache health check passed.");
        }
    }

    cache
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, command = %ctx.command().qualified_name, "command error");

            let embed = serenity::CreateEmbed::new()
                .title("Command Error")
                .description("Something went wrong while running this command.")
                .color(warden_utils::embed::WARNING_EMBED_COLOR);

            let _ = ctx
                .send(poise::CreateReply::default().ephemeral(true).embed(embed))
                .await;
        }
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            let usage = format!("Usage: `!{}`", ctx.command().qualified_name);
            let description = if let Some(input) = input {
                format!("Invalid argument: `{}`\n{}", input, usage)
            } else {
                format!("Missing required argument.\n{}", usage)
            };

            let _ = ctx.say(description).await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        other => {
            error!(?other, "framework error");
        }
    }
}

async fn handle_event(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::ThreadDelete { thread, .. } => {
            events::threads::handle_thread_delete(data, thread).await;
        }
        serenity::FullEvent::Ready { data_about_bot } => {
            events::threads::handle_ready(data_about_bot);
        }
        _ => {}
    }

    Ok(())
}
