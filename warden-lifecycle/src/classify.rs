use crate::detector::{ClosedMarker, ClosureMatch, find_closure};
use crate::snapshot::{MessageSnapshot, ThreadState};

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadClassification {
    /// Registered exemption; never deleted, kept open.
    Exempted,
    /// Marker found, grace period still running.
    ClosedPending { closed_at: i64, due_at: i64 },
    /// Marker found and the grace period has elapsed.
    ClosedOverdue { closed_at: i64, due_at: i64 },
    /// Archived by inactivity without anyone closing it.
    StaleReopened,
}

impl ThreadClassification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exempted => "Exempted",
            Self::ClosedPending { .. } => "Closed (pending)",
            Self::ClosedOverdue { .. } => "Closed (overdue)",
            Self::StaleReopened => "Stale",
        }
    }

    pub fn due_at(&self) -> Option<i64> {
        match self {
            Self::ClosedPending { due_at, .. } | Self::ClosedOverdue { due_at, .. } => {
                Some(*due_at)
            }
            Self::Exempted | Self::StaleReopened => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadAction {
    None,
    Reopen,
    Delete,
}

impl ThreadAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "leave",
            Self::Reopen => "reopen",
            Self::Delete => "delete",
        }
    }
}

/// Classify a thread from its exemption status and closure scan.
///
/// Overdue means `now >= closed_at + delete_delay_secs`.
pub fn classify(
    exempt: bool,
    closure: Option<&ClosureMatch>,
    delete_delay_secs: i64,
    now: i64,
) -> ThreadClassification {
    if exempt {
        return ThreadClassification::Exempted;
    }

    match closure {
        Some(closure) => {
            let closed_at = closure.closed_at;
            let due_at = closed_at.saturating_add(delete_delay_secs.max(0));
            if now >= due_at {
                ThreadClassification::ClosedOverdue { closed_at, due_at }
            } else {
                ThreadClassification::ClosedPending { closed_at, due_at }
            }
        }
        None => ThreadClassification::StaleReopened,
    }
}

/// Run the detector over `history` and classify the result.
pub fn classify_thread(
    exempt: bool,
    history: &[MessageSnapshot],
    marker: &ClosedMarker,
    delete_delay_secs: i64,
    now: i64,
) -> (ThreadClassification, Option<ClosureMatch>) {
    if exempt {
        return (ThreadClassification::Exempted, None);
    }

    let closure = find_closure(history, marker);
    (
        classify(false, closure.as_ref(), delete_delay_secs, now),
        closure,
    )
}

pub fn planned_action(classification: &ThreadClassification, thread: &ThreadState) -> ThreadAction {
    match classification {
        ThreadClassification::Exempted | ThreadClassification::StaleReopened => {
            if thread.archived {
                ThreadAction::Reopen
            } else {
                ThreadAction::None
            }
        }
        ThreadClassification::ClosedPending { .. } => ThreadAction::None,
        ThreadClassification::ClosedOverdue { .. } => ThreadAction::Delete,
    }
}

pub fn delay_days_to_secs(days: u64) -> i64 {
    i64::try_from(days)
        .unwrap_or(i64::MAX)
        .saturating_mul(SECONDS_PER_DAY)
}
