use poise::serenity_prelude as serenity;

use warden_database::model::passes::LifecyclePassRecord;
use warden_database::model::thread_settings::ThreadSettings;
use warden_lifecycle::{Outcome, PassReport, ThreadAction, ThreadVerdict};
use warden_utils::embed::{DEFAULT_EMBED_COLOR, WARNING_EMBED_COLOR};
use warden_utils::formatting::{
    channel_mention, format_day_count, format_interval_minutes, relative_timestamp,
};

/// Log channel embeds list at most this many thread lines.
const SUMMARY_DETAIL_LINES: usize = 15;

pub fn no_containers_message() -> &'static str {
    "No thread containers are monitored yet. Add one with `!monitor add #channel`."
}

pub fn outcome_label(outcome: Outcome) -> String {
    match outcome {
        Outcome::Unchanged => "no action".to_owned(),
        Outcome::Reopened => "reopened".to_owned(),
        Outcome::Deleted => "deleted".to_owned(),
        Outcome::WouldReopen => "would reopen".to_owned(),
        Outcome::WouldDelete => "would delete".to_owned(),
        Outcome::Skipped(kind) => format!("skipped ({})", kind.label()),
        Outcome::Failed(action, kind) => format!("{} failed ({})", action.label(), kind.label()),
    }
}

/// One line per inspected thread: mention, classification, outcome.
pub fn verdict_line(verdict: &ThreadVerdict) -> String {
    let classification = verdict
        .classification
        .map_or("Unclassified", |classification| classification.label());

    let mut line = format!(
        "{} **{}** → {}",
        channel_mention(verdict.thread.id),
        classification,
        outcome_label(verdict.outcome)
    );

    if let Some(due_at) = verdict.classification.and_then(|c| c.due_at())
        && verdict.action != ThreadAction::Delete
    {
        line.push_str(&format!(", deletes {}", relative_timestamp(due_at)));
    }

    line
}

/// Verdict line plus where the closure marker was found.
pub fn preview_line(verdict: &ThreadVerdict) -> String {
    match verdict.closure {
        Some(closure) => format!(
            "{} (marker in {})",
            verdict_line(verdict),
            closure.location.label()
        ),
        None => verdict_line(verdict),
    }
}

/// Closed threads ordered by deletion time, overdue ones first.
pub fn schedule_lines(report: &PassReport) -> Vec<String> {
    let mut closed: Vec<(i64, &ThreadVerdict)> = report
        .verdicts
        .iter()
        .filter_map(|verdict| {
            verdict
                .classification
                .and_then(|c| c.due_at())
                .map(|due_at| (due_at, verdict))
        })
        .collect();
    closed.sort_by_key(|(due_at, verdict)| (*due_at, verdict.thread.id));

    closed
        .into_iter()
        .map(|(due_at, verdict)| {
            let when = if verdict.action == ThreadAction::Delete {
                "overdue".to_owned()
            } else {
                relative_timestamp(due_at)
            };
            format!(
                "{} closed {}, deletes {}",
                channel_mention(verdict.thread.id),
                verdict
                    .closure
                    .map_or_else(|| "at an unknown time".to_owned(), |m| relative_timestamp(m.closed_at)),
                when
            )
        })
        .collect()
}

pub fn settings_description(settings: &ThreadSettings, containers: usize, exempt: usize) -> String {
    let log_channel = settings
        .log_channel_id
        .map_or_else(|| "Not set".to_owned(), channel_mention);

    format!(
        "**Scan Interval :** {}\n\
         **Delete Delay :** {}\n\
         **Log Channel :** {}\n\
         **Monitored Containers :** {}\n\
         **Exempt Threads :** {}",
        format_interval_minutes(settings.scan_interval_minutes),
        format_day_count(settings.delete_delay_days),
        log_channel,
        containers,
        exempt
    )
}

pub fn last_pass_description(record: Option<&LifecyclePassRecord>, next_due_at: i64) -> String {
    let Some(record) = record else {
        return format!(
            "No pass has run yet. The first one starts {}.",
            relative_timestamp(next_due_at)
        );
    };

    format!(
        "**Finished :** {}\n\
         **Inspected :** {}\n\
         **Reopened :** {}\n\
         **Deleted :** {}\n\
         **Failures :** {}\n\
         **Next Pass :** {}",
        relative_timestamp(i64::try_from(record.finished_at).unwrap_or(i64::MAX)),
        record.inspected,
        record.reopened,
        record.deleted,
        record.failed,
        relative_timestamp(next_due_at)
    )
}

pub fn pass_summary_description(report: &PassReport) -> String {
    let mut out = format!(
        "**Inspected :** {}\n**Reopened :** {}\n**Deleted :** {}\n**Failures :** {}",
        report.inspected(),
        report.reopened(),
        report.deleted(),
        report.failed()
    );

    let notable: Vec<String> = report
        .verdicts
        .iter()
        .filter(|verdict| verdict.outcome != Outcome::Unchanged)
        .map(verdict_line)
        .chain(report.container_failures.iter().map(|(container_id, kind)| {
            format!(
                "{} listing failed ({})",
                channel_mention(*container_id),
                kind.label()
            )
        }))
        .collect();

    if !notable.is_empty() {
        out.push_str("\n\n");
        out.push_str(&notable[..notable.len().min(SUMMARY_DETAIL_LINES)].join("\n"));
        if notable.len() > SUMMARY_DETAIL_LINES {
            out.push_str(&format!(
                "\n…and {} more",
                notable.len() - SUMMARY_DETAIL_LINES
            ));
        }
    }

    out
}

/// Log channel embed posted after an applied pass.
pub fn pass_summary_embed(report: &PassReport) -> serenity::CreateEmbed {
    let color = if report.failed() > 0 {
        WARNING_EMBED_COLOR
    } else {
        DEFAULT_EMBED_COLOR
    };

    serenity::CreateEmbed::new()
        .title("Thread Lifecycle Pass")
        .color(color)
        .description(pass_summary_description(report))
}
