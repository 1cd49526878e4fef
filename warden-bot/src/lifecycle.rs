//! Background coordinator that owns every applied lifecycle pass.
//!
//! One task per process. It wakes on a fixed tick, re-reads the guild's
//! settings, and runs a pass when the interval has elapsed. Commands and
//! gateway events reach it through `LifecycleSignal`s, so thread deletions
//! and forced scans are handled in order with scheduled passes.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use warden_commands::threads::pass_summary_embed;
use warden_core::LifecycleSignal;
use warden_core::lifecycle::load_guild_snapshot;
use warden_database::Database;
use warden_database::impls::exemptions::{forget_thread, remove_exemption};
use warden_database::impls::passes::{last_pass, record_pass};
use warden_database::impls::thread_settings::get_thread_settings;
use warden_database::model::passes::LifecyclePassRecord;
use warden_lifecycle::schedule::pass_is_due;
use warden_lifecycle::{LifecycleConfig, PassMode, PassOptions, PassReport, ThreadGateway, run_pass};
use warden_utils::time::now_unix_secs;

pub struct Coordinator<G> {
    db: Database,
    gateway: G,
    config: Arc<LifecycleConfig>,
    guild_id: u64,
}

impl<G: ThreadGateway> Coordinator<G> {
    pub fn new(db: Database, gateway: G, config: Arc<LifecycleConfig>, guild_id: u64) -> Self {
        Self {
            db,
            gateway,
            config,
            guild_id,
        }
    }

    /// Run a pass if the configured interval has elapsed since the last one.
    pub async fn check_schedule(&self, now: u64) -> anyhow::Result<Option<PassReport>> {
        let settings = get_thread_settings(&self.db, self.guild_id).await?;
        let last = last_pass(&self.db, self.guild_id).await?;

        if !pass_is_due(
            last.map(|record| record.finished_at),
            settings.scan_interval_minutes,
            now,
        ) {
            debug!(guild_id = self.guild_id, "lifecycle pass not due");
            return Ok(None);
        }

        self.run_applied_pass(now).await.map(Some)
    }

    /// Run an applied pass now, clean up vanished exemptions and record it.
    pub async fn run_applied_pass(&self, now: u64) -> anyhow::Result<PassReport> {
        let snapshot = load_guild_snapshot(&self.db, self.guild_id).await?;
        let options = PassOptions {
            mode: PassMode::Apply,
            marker: &self.config.marker,
            history_limit: self.config.scan_history_limit,
            only_container: None,
        };

        let started_at = i64::try_from(now).unwrap_or(i64::MAX);
        let report = run_pass(&self.gateway, &snapshot, &options, started_at).await;

        for thread_id in &report.vanished_exemptions {
            match remove_exemption(&self.db, self.guild_id, *thread_id).await {
                Ok(_) => info!(
                    guild_id = self.guild_id,
                    thread_id, "removed exemption for vanished thread"
                ),
                Err(source) => warn!(
                    ?source,
                    guild_id = self.guild_id,
                    thread_id,
                    "failed to remove exemption for vanished thread"
                ),
            }
        }

        let record = LifecyclePassRecord {
            guild_id: self.guild_id,
            finished_at: now_unix_secs().max(now),
            inspected: report.inspected() as u64,
            reopened: report.reopened() as u64,
            deleted: report.deleted() as u64,
            failed: report.failed() as u64,
        };
        record_pass(&self.db, record).await?;

        info!(
            guild_id = self.guild_id,
            inspected = record.inspected,
            reopened = record.reopened,
            deleted = record.deleted,
            failed = record.failed,
            "lifecycle pass finished"
        );

        Ok(report)
    }

    pub async fn forget_deleted_thread(&self, thread_id: u64) -> anyhow::Result<()> {
        if forget_thread(&self.db, thread_id).await? {
            info!(thread_id, "dropped exemption for deleted thread");
        }
        Ok(())
    }

    /// Log channel for the pass summary, when one is configured and the
    /// pass did something worth reporting.
    async fn summary_channel(&self, report: &PassReport) -> Option<u64> {
        if !should_post_summary(report) {
            return None;
        }

        match get_thread_settings(&self.db, self.guild_id).await {
            Ok(settings) => settings.log_channel_id,
            Err(source) => {
                warn!(?source, guild_id = self.guild_id, "failed to load log channel");
                None
            }
        }
    }
}

pub fn should_post_summary(report: &PassReport) -> bool {
    report.took_action() || report.failed() > 0
}

/// Drive the coordinator until the signal channel closes.
pub async fn run_coordinator<G: ThreadGateway>(
    coordinator: Coordinator<G>,
    http: Arc<serenity::Http>,
    mut signals: mpsc::Receiver<LifecycleSignal>,
) {
    let mut tick = tokio::time::interval(coordinator.config.schedule_check);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        guild_id = coordinator.guild_id,
        check_secs = coordinator.config.schedule_check.as_secs(),
        "lifecycle coordinator started"
    );

    loop {
        let report = tokio::select! {
            _ = tick.tick() => coordinator.check_schedule(now_unix_secs()).await,
            signal = signals.recv() => match signal {
                Some(LifecycleSignal::RunNow) => {
                    info!(guild_id = coordinator.guild_id, "manual lifecycle pass requested");
                    coordinator.run_applied_pass(now_unix_secs()).await.map(Some)
                }
                Some(LifecycleSignal::SettingsChanged) => {
                    coordinator.check_schedule(now_unix_secs()).await
                }
                Some(LifecycleSignal::ThreadDeleted(thread_id)) => {
                    coordinator.forget_deleted_thread(thread_id).await.map(|()| None)
                }
                None => {
                    info!("lifecycle signal channel closed; coordinator stopping");
                    break;
                }
            },
        };

        match report {
            Ok(Some(report)) => post_summary(&coordinator, &http, &report).await,
            Ok(None) => {}
            Err(source) => error!(
                ?source,
                guild_id = coordinator.guild_id,
                "lifecycle check failed; retrying next tick"
            ),
        }
    }
}

async fn post_summary<G: ThreadGateway>(
    coordinator: &Coordinator<G>,
    http: &serenity::Http,
    report: &PassReport,
) {
    let Some(channel_id) = coordinator.summary_channel(report).await else {
        return;
    };

    if let Err(source) = serenity::ChannelId::new(channel_id)
        .send_message(
            http,
            serenity::CreateMessage::new().embed(pass_summary_embed(report)),
        )
        .await
    {
        warn!(?source, channel_id, "failed to post lifecycle summary");
    }
}
