pub mod embeds;
pub mod exempt;
pub mod monitor;
pub mod threadconfig;
pub mod threadpreview;
pub mod threadscan;
pub mod threadschedule;
pub mod threadstatus;

pub use embeds::pass_summary_embed;

use poise::serenity_prelude as serenity;
use warden_core::{Context, Error};
use warden_lifecycle::{GuildSnapshot, PassMode, PassOptions, PassReport, SerenityGateway, run_pass};
use warden_utils::permissions::require_permission;
use warden_utils::time::now_unix_secs_i64;

/// Permission gate shared by the thread commands, scoped to the managed
/// guild.
pub(crate) async fn authorize(
    ctx: Context<'_>,
    required: serenity::Permissions,
) -> Result<Option<serenity::GuildId>, Error> {
    let managed = serenity::GuildId::new(ctx.data().guild_id);
    require_permission(ctx, managed, required).await
}

/// Read-only pass used by the preview and schedule reports.
pub(crate) async fn dry_run_report(
    ctx: Context<'_>,
    snapshot: &GuildSnapshot,
    only_container: Option<u64>,
) -> PassReport {
    let config = &ctx.data().lifecycle_config;
    let gateway = SerenityGateway::new(ctx.serenity_context().http.clone());
    let options = PassOptions {
        mode: PassMode::DryRun,
        marker: &config.marker,
        history_limit: config.preview_history_limit,
        only_container,
    };

    run_pass(&gateway, snapshot, &options, now_unix_secs_i64()).await
}
