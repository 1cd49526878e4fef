//! Reconciliation pass tests against a recording in-memory gateway.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use warden_lifecycle::{
    ClosedMarker, EmbedFieldSnapshot, EmbedSnapshot, FailureKind, GatewayError, GuildSnapshot,
    MessageSnapshot, Outcome, PassMode, PassOptions, ThreadAction, ThreadClassification,
    ThreadGateway, ThreadState, run_pass,
};

const DAY: i64 = 86_400;
const NOW: i64 = 1_750_000_000;
const CONTAINER: u64 = 500;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Reopen(u64),
    Delete(u64),
}

#[derive(Default)]
struct MockGateway {
    containers: HashMap<u64, Result<Vec<ThreadState>, GatewayError>>,
    threads: HashMap<u64, ThreadState>,
    histories: HashMap<u64, Result<Vec<MessageSnapshot>, GatewayError>>,
    reopen_errors: HashMap<u64, GatewayError>,
    delete_errors: HashMap<u64, GatewayError>,
    calls: Mutex<Vec<Call>>,
    history_requests: Mutex<Vec<(u64, u8)>>,
}

impl MockGateway {
    fn with_container(mut self, container_id: u64, threads: Vec<ThreadState>) -> Self {
        for thread in &threads {
            self.threads.insert(thread.id, thread.clone());
        }
        self.containers.insert(container_id, Ok(threads));
        self
    }

    fn with_history(mut self, thread_id: u64, history: Vec<MessageSnapshot>) -> Self {
        self.histories.insert(thread_id, Ok(history));
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ThreadGateway for MockGateway {
    async fn archived_threads(&self, container_id: u64) -> Result<Vec<ThreadState>, GatewayError> {
        self.containers
            .get(&container_id)
            .cloned()
            .unwrap_or_else(|| Err(GatewayError::NotFound(format!("container {container_id}"))))
    }

    async fn thread(&self, thread_id: u64) -> Result<ThreadState, GatewayError> {
        self.threads
            .get(&thread_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("thread {thread_id}")))
    }

    async fn recent_messages(
        &self,
        thread_id: u64,
        limit: u8,
    ) -> Result<Vec<MessageSnapshot>, GatewayError> {
        self.history_requests
            .lock()
            .expect("history lock")
            .push((thread_id, limit));
        self.histories
            .get(&thread_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn reopen_thread(&self, thread_id: u64) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(Call::Reopen(thread_id));
        match self.reopen_errors.get(&thread_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn delete_thread(&self, thread_id: u64) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(Call::Delete(thread_id));
        match self.delete_errors.get(&thread_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn archived(id: u64) -> ThreadState {
    ThreadState {
        id,
        parent_id: Some(CONTAINER),
        name: format!("thread-{id}"),
        archived: true,
        locked: false,
        archived_at: Some(NOW - DAY),
    }
}

fn text(id: u64, created_at: i64, content: &str) -> MessageSnapshot {
    MessageSnapshot {
        id,
        created_at,
        content: content.to_owned(),
        ..Default::default()
    }
}

fn marker() -> ClosedMarker {
    ClosedMarker::new("this thread has been closed").expect("marker")
}

fn snapshot(exempt: &[u64]) -> GuildSnapshot {
    GuildSnapshot {
        guild_id: 1,
        delete_delay_days: 7,
        containers: vec![CONTAINER],
        exempt: exempt.iter().copied().collect::<BTreeSet<u64>>(),
    }
}

fn apply_options(marker: &ClosedMarker) -> PassOptions<'_> {
    PassOptions {
        mode: PassMode::Apply,
        marker,
        history_limit: 100,
        only_container: None,
    }
}

#[tokio::test]
async fn three_thread_scenario_reopens_deletes_reopens() {
    let closing_embed = MessageSnapshot {
        id: 21,
        created_at: NOW - 8 * DAY,
        embeds: vec![EmbedSnapshot {
            title: Some("Ticket".to_owned()),
            fields: vec![EmbedFieldSnapshot {
                name: "Status".to_owned(),
                value: "This thread has been closed.".to_owned(),
            }],
            ..Default::default()
        }],
        ..Default::default()
    };

    let gateway = MockGateway::default()
        .with_container(CONTAINER, vec![archived(1), archived(2), archived(3)])
        .with_history(2, vec![text(22, NOW - 8 * DAY + 5, "thanks!"), closing_embed])
        .with_history(3, vec![text(31, NOW - 3 * DAY, "anyone around?")]);

    let marker = marker();
    let report = run_pass(&gateway, &snapshot(&[1]), &apply_options(&marker), NOW).await;

    assert_eq!(
        gateway.calls(),
        vec![Call::Reopen(1), Call::Delete(2), Call::Reopen(3)]
    );
    assert_eq!(report.inspected(), 3);
    assert_eq!(report.reopened(), 2);
    assert_eq!(report.deleted(), 1);
    assert_eq!(report.failed(), 0);

    let by_id: HashMap<u64, &warden_lifecycle::ThreadVerdict> = report
        .verdicts
        .iter()
        .map(|verdict| (verdict.thread.id, verdict))
        .collect();
    assert_eq!(
        by_id[&1].classification,
        Some(ThreadClassification::Exempted)
    );
    assert!(matches!(
        by_id[&2].classification,
        Some(ThreadClassification::ClosedOverdue { .. })
    ));
    assert_eq!(
        by_id[&3].classification,
        Some(ThreadClassification::StaleReopened)
    );
}

#[tokio::test]
async fn exempt_threads_do_not_fetch_history() {
    let gateway = MockGateway::default().with_container(CONTAINER, vec![archived(1)]);
    let marker = marker();

    run_pass(&gateway, &snapshot(&[1]), &apply_options(&marker), NOW).await;

    assert!(gateway.history_requests.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn open_exempt_thread_triggers_no_action() {
    let mut gateway = MockGateway::default().with_container(CONTAINER, Vec::new());
    let mut open = archived(9);
    open.archived = false;
    gateway.threads.insert(9, open);

    let marker = marker();
    let report = run_pass(&gateway, &snapshot(&[9]), &apply_options(&marker), NOW).await;

    assert!(gateway.calls().is_empty());
    assert_eq!(report.verdicts.len(), 1);
    assert_eq!(report.verdicts[0].action, ThreadAction::None);
    assert_eq!(report.verdicts[0].outcome, Outcome::Unchanged);
}

#[tokio::test]
async fn overdue_thread_is_deleted_exactly_once_even_if_listed_twice() {
    let gateway = MockGateway::default()
        .with_container(CONTAINER, vec![archived(2), archived(2)])
        .with_history(2, vec![text(20, NOW - 10 * DAY, "This thread has been closed")]);

    let mut snap = snapshot(&[]);
    snap.containers.push(CONTAINER);

    let marker = marker();
    let report = run_pass(&gateway, &snap, &apply_options(&marker), NOW).await;

    assert_eq!(gateway.calls(), vec![Call::Delete(2)]);
    assert_eq!(report.deleted(), 1);
}

#[tokio::test]
async fn pending_closure_stays_archived() {
    let gateway = MockGateway::default()
        .with_container(CONTAINER, vec![archived(4)])
        .with_history(4, vec![text(40, NOW - 2 * DAY, "this thread has been closed")]);

    let marker = marker();
    let report = run_pass(&gateway, &snapshot(&[]), &apply_options(&marker), NOW).await;

    assert!(gateway.calls().is_empty());
    assert_eq!(
        report.verdicts[0].classification,
        Some(ThreadClassification::ClosedPending {
            closed_at: NOW - 2 * DAY,
            due_at: NOW + 5 * DAY,
        })
    );
}

#[tokio::test]
async fn marker_in_component_label_counts_as_closed() {
    let mut message = text(50, NOW - 9 * DAY, "");
    message.components = json!([
        { "type": 1, "components": [{ "type": 2, "label": "This thread has been closed", "custom_id": "x" }] }
    ]);

    let gateway = MockGateway::default()
        .with_container(CONTAINER, vec![archived(5)])
        .with_history(5, vec![message]);

    let marker = marker();
    run_pass(&gateway, &snapshot(&[]), &apply_options(&marker), NOW).await;

    assert_eq!(gateway.calls(), vec![Call::Delete(5)]);
}

#[tokio::test]
async fn history_failure_skips_thread_without_action() {
    let mut gateway = MockGateway::default().with_container(CONTAINER, vec![archived(6), archived(7)]);
    gateway.histories.insert(
        6,
        Err(GatewayError::PermissionDenied("Missing Access".to_owned())),
    );

    let marker = marker();
    let report = run_pass(&gateway, &snapshot(&[]), &apply_options(&marker), NOW).await;

    assert_eq!(gateway.calls(), vec![Call::Reopen(7)]);
    assert_eq!(
        report.verdicts[0].outcome,
        Outcome::Skipped(FailureKind::PermissionDenied)
    );
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn action_failures_are_recorded_and_pass_continues() {
    let mut gateway = MockGateway::default()
        .with_container(CONTAINER, vec![archived(2), archived(3)])
        .with_history(2, vec![text(20, NOW - 30 * DAY, "this thread has been closed")]);
    gateway
        .delete_errors
        .insert(2, GatewayError::PermissionDenied("Missing Permissions".to_owned()));

    let marker = marker();
    let report = run_pass(&gateway, &snapshot(&[]), &apply_options(&marker), NOW).await;

    assert_eq!(gateway.calls(), vec![Call::Delete(2), Call::Reopen(3)]);
    assert_eq!(
        report.verdicts[0].outcome,
        Outcome::Failed(ThreadAction::Delete, FailureKind::PermissionDenied)
    );
    assert_eq!(report.reopened(), 1);
}

#[tokio::test]
async fn container_listing_failure_moves_on() {
    let gateway = MockGateway::default().with_container(CONTAINER, vec![archived(3)]);
    let snap = GuildSnapshot {
        containers: vec![404, CONTAINER],
        ..snapshot(&[])
    };

    let marker = marker();
    let report = run_pass(&gateway, &snap, &apply_options(&marker), NOW).await;

    assert_eq!(report.container_failures, vec![(404, FailureKind::NotFound)]);
    assert_eq!(gateway.calls(), vec![Call::Reopen(3)]);
}

#[tokio::test]
async fn vanished_exempt_threads_are_reported() {
    let gateway = MockGateway::default().with_container(CONTAINER, Vec::new());

    let marker = marker();
    let report = run_pass(&gateway, &snapshot(&[77]), &apply_options(&marker), NOW).await;

    assert_eq!(report.vanished_exemptions, vec![77]);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn dry_run_never_mutates() {
    let gateway = MockGateway::default()
        .with_container(CONTAINER, vec![archived(1), archived(2), archived(3)])
        .with_history(2, vec![text(20, NOW - 8 * DAY, "this thread has been closed")]);

    let marker = marker();
    let options = PassOptions {
        mode: PassMode::DryRun,
        marker: &marker,
        history_limit: 20,
        only_container: Some(CONTAINER),
    };
    let report = run_pass(&gateway, &snapshot(&[1]), &options, NOW).await;

    assert!(gateway.calls().is_empty());
    let outcomes: Vec<Outcome> = report.verdicts.iter().map(|v| v.outcome).collect();
    assert_eq!(
        outcomes,
        vec![Outcome::WouldReopen, Outcome::WouldDelete, Outcome::WouldReopen]
    );
    assert!(
        gateway
            .history_requests
            .lock()
            .expect("lock")
            .iter()
            .all(|(_, limit)| *limit == 20)
    );
}
