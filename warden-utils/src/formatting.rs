/// Format seconds into a compact human-readable duration (e.g. 59s, 1m, 1h, 1d, 1h 30m).
pub fn format_compact_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        return if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}d", days)
        };
    }

    if hours > 0 {
        let mut parts = vec![format!("{}h", hours)];
        if minutes > 0 {
            parts.push(format!("{}m", minutes));
        }
        if seconds > 0 {
            parts.push(format!("{}s", seconds));
        }
        return parts.join(" ");
    }

    if minutes > 0 {
        return if seconds > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}m", minutes)
        };
    }

    format!("{}s", seconds)
}

pub fn channel_mention(channel_id: u64) -> String {
    format!("<#{}>", channel_id)
}

pub fn user_mention(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

/// Discord relative timestamp, e.g. "in 3 days".
pub fn relative_timestamp(unix_secs: i64) -> String {
    format!("<t:{}:R>", unix_secs)
}

/// "Every 1h", "Every 30m": scan interval display.
pub fn format_interval_minutes(minutes: u64) -> String {
    format!("Every {}", format_compact_duration(minutes.saturating_mul(60)))
}

pub fn format_day_count(days: u64) -> String {
    match days {
        0 => "immediately".to_owned(),
        1 => "1 day".to_owned(),
        n => format!("{} days", n),
    }
}

/// Split lines into page bodies no longer than `max_chars`, keeping whole lines.
pub fn chunk_lines(lines: &[String], max_lines: usize, max_chars: usize) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for line in lines {
        let would_overflow = !current.is_empty() && current.len() + line.len() + 1 > max_chars;
        if count == max_lines || would_overflow {
            pages.push(std::mem::take(&mut current));
            count = 0;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
        count += 1;
    }

    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::{
        channel_mention, chunk_lines, format_compact_duration, format_day_count,
        format_interval_minutes, relative_timestamp,
    };

    #[test]
    fn compact_duration_formatting() {
        assert_eq!(format_compact_duration(59), "59s");
        assert_eq!(format_compact_duration(60), "1m");
        assert_eq!(format_compact_duration(61), "1m 1s");
        assert_eq!(format_compact_duration(3600), "1h");
        assert_eq!(format_compact_duration(3660), "1h 1m");
        assert_eq!(format_compact_duration(86400), "1d");
        assert_eq!(format_compact_duration(90000), "1d 1h");
    }

    #[test]
    fn settings_display() {
        assert_eq!(format_interval_minutes(60), "Every 1h");
        assert_eq!(format_interval_minutes(90), "Every 1h 30m");
        assert_eq!(format_day_count(0), "immediately");
        assert_eq!(format_day_count(1), "1 day");
        assert_eq!(format_day_count(7), "7 days");
    }

    #[test]
    fn mentions_and_timestamps() {
        assert_eq!(channel_mention(5), "<#5>");
        assert_eq!(relative_timestamp(1_700_000_000), "<t:1700000000:R>");
    }

    #[test]
    fn chunking_respects_line_and_char_limits() {
        let lines: Vec<String> = (1..=5).map(|n| format!("line {n}")).collect();

        assert_eq!(
            chunk_lines(&lines, 2, 4_000),
            vec!["line 1\nline 2", "line 3\nline 4", "line 5"]
        );
        assert_eq!(chunk_lines(&lines, 10, 13), vec![
            "line 1\nline 2",
            "line 3\nline 4",
            "line 5"
        ]);
        assert!(chunk_lines(&[], 5, 100).is_empty());
    }
}
