//! One lifecycle pass over a guild.
//!
//! The pass visits every exempt thread directly, then every monitored
//! container in configuration order. Each thread is visited at most once,
//! so a pass never makes more than one reopen or delete attempt per thread.
//! Failures are logged and recorded in the report; the next pass retries.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::classify::{
    ThreadAction, ThreadClassification, classify_thread, delay_days_to_secs, planned_action,
};
use crate::detector::{ClosedMarker, ClosureMatch};
use crate::gateway::{FailureKind, GatewayError, ThreadGateway};
use crate::snapshot::ThreadState;

/// Guild state loaded once per cycle and handed to the pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuildSnapshot {
    pub guild_id: u64,
    pub delete_delay_days: u64,
    pub containers: Vec<u64>,
    pub exempt: BTreeSet<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassMode {
    Apply,
    DryRun,
}

#[derive(Clone, Debug)]
pub struct PassOptions<'a> {
    pub mode: PassMode,
    pub marker: &'a ClosedMarker,
    pub history_limit: u8,
    /// Restrict the pass to one container and skip the direct exempt sweep.
    pub only_container: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Reopened,
    Deleted,
    WouldReopen,
    WouldDelete,
    /// History could not be read; the thread was not classified.
    Skipped(FailureKind),
    Failed(ThreadAction, FailureKind),
}

impl Outcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Skipped(_) | Self::Failed(..))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadVerdict {
    pub thread: ThreadState,
    pub container_id: Option<u64>,
    pub classification: Option<ThreadClassification>,
    pub closure: Option<ClosureMatch>,
    pub action: ThreadAction,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub verdicts: Vec<ThreadVerdict>,
    pub container_failures: Vec<(u64, FailureKind)>,
    /// Exempt threads that no longer exist; their registry rows can go.
    pub vanished_exemptions: Vec<u64>,
}

impl PassReport {
    pub fn inspected(&self) -> usize {
        self.verdicts.len()
    }

    pub fn reopened(&self) -> usize {
        self.count(|outcome| outcome == Outcome::Reopened)
    }

    pub fn deleted(&self) -> usize {
        self.count(|outcome| outcome == Outcome::Deleted)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure) + self.container_failures.len()
    }

    pub fn took_action(&self) -> bool {
        self.reopened() > 0 || self.deleted() > 0
    }

    fn count(&self, predicate: impl Fn(Outcome) -> bool) -> usize {
        self.verdicts
            .iter()
            .filter(|verdict| predicate(verdict.outcome))
            .count()
    }
}

pub async fn run_pass<G>(
    gateway: &G,
    snapshot: &GuildSnapshot,
    options: &PassOptions<'_>,
    now: i64,
) -> PassReport
where
    G: ThreadGateway + ?Sized,
{
    let mut report = PassReport::default();
    let mut visited: HashSet<u64> = HashSet::new();

    if options.only_container.is_none() {
        for &thread_id in &snapshot.exempt {
            match gateway.thread(thread_id).await {
                Ok(thread) => {
                    visited.insert(thread.id);
                    let verdict = visit_thread(gateway, snapshot, options, thread, None, now).await;
                    report.verdicts.push(verdict);
                }
                Err(GatewayError::NotFound(_)) => {
                    info!(
                        guild_id = snapshot.guild_id,
                        thread_id, "exempt thread no longer exists"
                    );
                    report.vanished_exemptions.push(thread_id);
                }
                Err(source) => {
                    warn!(
                        ?source,
                        guild_id = snapshot.guild_id,
                        thread_id,
                        "failed to resolve exempt thread"
                    );
                }
            }
        }
    }

    for &container_id in &snapshot.containers {
        if options
            .only_container
            .is_some_and(|only| only != container_id)
        {
            continue;
        }

        let threads = match gateway.archived_threads(container_id).await {
            Ok(threads) => threads,
            Err(source) => {
                warn!(
                    ?source,
                    guild_id = snapshot.guild_id,
                    container_id,
                    "failed to list archived threads"
                );
                report.container_failures.push((container_id, source.kind()));
                continue;
            }
        };

        debug!(
            guild_id = snapshot.guild_id,
            container_id,
            count = threads.len(),
            "listed archived threads"
        );

        for thread in threads {
            if !visited.insert(thread.id) {
                continue;
            }

            let verdict =
                visit_thread(gateway, snapshot, options, thread, Some(container_id), now).await;
            report.verdicts.push(verdict);
        }
    }

    report
}

async fn visit_thread<G>(
    gateway: &G,
    snapshot: &GuildSnapshot,
    options: &PassOptions<'_>,
    thread: ThreadState,
    container_id: Option<u64>,
    now: i64,
) -> ThreadVerdict
where
    G: ThreadGateway + ?Sized,
{
    let exempt = snapshot.exempt.contains(&thread.id);
    let delay_secs = delay_days_to_secs(snapshot.delete_delay_days);

    let history = if exempt {
        Vec::new()
    } else {
        match gateway
            .recent_messages(thread.id, options.history_limit)
            .await
        {
            Ok(history) => history,
            Err(source) => {
                warn!(
                    ?source,
                    guild_id = snapshot.guild_id,
                    thread_id = thread.id,
                    "failed to read thread history; skipping until next pass"
                );
                return ThreadVerdict {
                    thread,
                    container_id,
                    classification: None,
                    closure: None,
                    action: ThreadAction::None,
                    outcome: Outcome::Skipped(source.kind()),
                };
            }
        }
    };

    let (classification, closure) =
        classify_thread(exempt, &history, options.marker, delay_secs, now);
    let action = planned_action(&classification, &thread);

    let outcome = match (options.mode, action) {
        (_, ThreadAction::None) => Outcome::Unchanged,
        (PassMode::DryRun, ThreadAction::Reopen) => Outcome::WouldReopen,
        (PassMode::DryRun, ThreadAction::Delete) => Outcome::WouldDelete,
        (PassMode::Apply, ThreadAction::Reopen) => match gateway.reopen_thread(thread.id).await {
            Ok(()) => {
                info!(
                    guild_id = snapshot.guild_id,
                    thread_id = thread.id,
                    classification = classification.label(),
                    "reopened archived thread"
                );
                Outcome::Reopened
            }
            Err(source) => {
                warn!(
                    ?source,
                    guild_id = snapshot.guild_id,
                    thread_id = thread.id,
                    "failed to reopen thread"
                );
                Outcome::Failed(action, source.kind())
            }
        },
        (PassMode::Apply, ThreadAction::Delete) => match gateway.delete_thread(thread.id).await {
            Ok(()) => {
                info!(
                    guild_id = snapshot.guild_id,
                    thread_id = thread.id,
                    closed_at = closure.map(|c| c.closed_at),
                    "deleted closed thread"
                );
                Outcome::Deleted
            }
            Err(source) => {
                warn!(
                    ?source,
                    guild_id = snapshot.guild_id,
                    thread_id = thread.id,
                    "failed to delete thread"
                );
                Outcome::Failed(action, source.kind())
            }
        },
    };

    ThreadVerdict {
        thread,
        container_id,
        classification: Some(classification),
        closure,
        action,
        outcome,
    }
}
