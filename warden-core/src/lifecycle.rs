//! Glue between stored guild state and the lifecycle pass, plus the
//! message queue commands and gateway events use to reach the coordinator.

use tokio::sync::mpsc;
use tracing::warn;

use warden_database::Database;
use warden_database::impls::containers::container_ids;
use warden_database::impls::exemptions::exempt_thread_ids;
use warden_database::impls::thread_settings::get_thread_settings;
use warden_lifecycle::GuildSnapshot;

/// Messages consumed by the per-guild lifecycle coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleSignal {
    /// Run an applied pass now instead of waiting for the interval.
    RunNow,
    /// Settings changed; re-evaluate the schedule immediately.
    SettingsChanged,
    /// A thread was deleted on Discord.
    ThreadDeleted(u64),
}

#[derive(Clone, Debug)]
pub struct LifecycleHandle {
    sender: mpsc::Sender<LifecycleSignal>,
}

impl LifecycleHandle {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<LifecycleSignal>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queue a signal without waiting. Returns `false` when the coordinator
    /// is gone or the queue is full. Only for hints that can be lost.
    pub fn notify(&self, signal: LifecycleSignal) -> bool {
        match self.sender.try_send(signal) {
            Ok(()) => true,
            Err(source) => {
                warn!(?source, ?signal, "lifecycle coordinator did not accept signal");
                false
            }
        }
    }

    /// Queue a signal, waiting for room. Returns `false` only when the
    /// coordinator is gone.
    pub async fn send(&self, signal: LifecycleSignal) -> bool {
        match self.sender.send(signal).await {
            Ok(()) => true,
            Err(source) => {
                warn!(?source, ?signal, "lifecycle coordinator is gone");
                false
            }
        }
    }
}

/// Load everything a pass needs for one guild, once per cycle.
pub async fn load_guild_snapshot(db: &Database, guild_id: u64) -> anyhow::Result<GuildSnapshot> {
    let settings = get_thread_settings(db, guild_id).await?;
    let containers = container_ids(db, guild_id).await?;
    let exempt = exempt_thread_ids(db, guild_id).await?;

    Ok(GuildSnapshot {
        guild_id,
        delete_delay_days: settings.delete_delay_days,
        containers,
        exempt,
    })
}

#[cfg(test)]
mod tests {
    use super::{LifecycleHandle, LifecycleSignal};

    #[tokio::test]
    async fn signals_arrive_in_order() {
        let (handle, mut receiver) = LifecycleHandle::channel(4);

        assert!(handle.notify(LifecycleSignal::SettingsChanged));
        assert!(handle.notify(LifecycleSignal::RunNow));

        assert_eq!(receiver.recv().await, Some(LifecycleSignal::SettingsChanged));
        assert_eq!(receiver.recv().await, Some(LifecycleSignal::RunNow));
    }

    #[tokio::test]
    async fn notify_fails_once_coordinator_is_gone() {
        let (handle, receiver) = LifecycleHandle::channel(1);
        drop(receiver);

        assert!(!handle.notify(LifecycleSignal::RunNow));
    }

    #[test]
    fn full_queue_drops_signal() {
        let (handle, _receiver) = LifecycleHandle::channel(1);

        assert!(handle.notify(LifecycleSignal::RunNow));
        assert!(!handle.notify(LifecycleSignal::RunNow));
    }

    #[tokio::test]
    async fn deletions_wait_for_a_full_queue() {
        let (handle, mut receiver) = LifecycleHandle::channel(1);
        assert!(handle.notify(LifecycleSignal::RunNow));

        let sender = handle.clone();
        let pending =
            tokio::spawn(async move { sender.send(LifecycleSignal::ThreadDeleted(7)).await });

        assert_eq!(receiver.recv().await, Some(LifecycleSignal::RunNow));
        assert_eq!(receiver.recv().await, Some(LifecycleSignal::ThreadDeleted(7)));
        assert!(pending.await.expect("send task"));
    }

    #[tokio::test]
    async fn send_fails_once_coordinator_is_gone() {
        let (handle, receiver) = LifecycleHandle::channel(1);
        drop(receiver);

        assert!(!handle.send(LifecycleSignal::ThreadDeleted(7)).await);
    }
}
