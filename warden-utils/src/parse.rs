/// Parse a compact duration token like `30s`, `10m`, `2h`, `1d`, or plain seconds.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let compact: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let bytes = compact.as_bytes();
    let mut cursor = 0;
    let mut total_seconds = 0_u64;
    let mut saw_unit_segment = false;

    while cursor < bytes.len() {
        let number_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }

        if number_start == cursor {
            return None;
        }

        let number = compact[number_start..cursor].parse::<u64>().ok()?;
        if number == 0 {
            return None;
        }

        let saw_unit = cursor < bytes.len();
        let multiplier = if saw_unit {
            let unit = bytes[cursor] as char;
            cursor += 1;

            match unit {
                's' | 'S' => 1_u64,
                'm' | 'M' => 60_u64,
                'h' | 'H' => 60_u64 * 60,
                'd' | 'D' => 60_u64 * 60 * 24,
                'w' | 'W' => 60_u64 * 60 * 24 * 7,
                _ => return None,
            }
        } else {
            1_u64
        };

        if !saw_unit && saw_unit_segment {
            return None;
        }

        saw_unit_segment = saw_unit_segment || saw_unit;

        let part_seconds = number.checked_mul(multiplier)?;
        total_seconds = total_seconds.checked_add(part_seconds)?;
    }

    if total_seconds == 0 {
        None
    } else {
        Some(total_seconds)
    }
}

/// Scan interval input: a bare number is minutes, otherwise a compact
/// duration rounded down to whole minutes.
pub fn parse_interval_minutes(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if let Ok(minutes) = value.parse::<u64>() {
        return (minutes > 0).then_some(minutes);
    }

    let minutes = parse_duration_seconds(value)? / 60;
    (minutes > 0).then_some(minutes)
}

/// Deletion delay input: a bare number (zero allowed) or `<n>d` / `<n>w`.
pub fn parse_delay_days(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if let Ok(days) = value.parse::<u64>() {
        return Some(days);
    }

    let seconds = parse_duration_seconds(value)?;
    (seconds % 86_400 == 0).then_some(seconds / 86_400)
}

/// Channel mention (`<#id>`) or raw snowflake.
pub fn parse_channel_id(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if let Ok(id) = value.parse::<u64>() {
        return Some(id).filter(|id| *id > 0);
    }

    value
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .and_then(|id| id.parse::<u64>().ok())
        .filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::{parse_channel_id, parse_delay_days, parse_duration_seconds, parse_interval_minutes};

    #[test]
    fn durations_combine_units() {
        assert_eq!(parse_duration_seconds("90"), Some(90));
        assert_eq!(parse_duration_seconds("1h30m"), Some(5_400));
        assert_eq!(parse_duration_seconds("1w"), Some(604_800));
        assert_eq!(parse_duration_seconds("0m"), None);
        assert_eq!(parse_duration_seconds("5x"), None);
        assert_eq!(parse_duration_seconds(""), None);
    }

    #[test]
    fn interval_accepts_minutes_or_durations() {
        assert_eq!(parse_interval_minutes("45"), Some(45));
        assert_eq!(parse_interval_minutes("2h"), Some(120));
        assert_eq!(parse_interval_minutes("90s"), Some(1));
        assert_eq!(parse_interval_minutes("30s"), None);
        assert_eq!(parse_interval_minutes("0"), None);
    }

    #[test]
    fn delay_accepts_whole_days() {
        assert_eq!(parse_delay_days("0"), Some(0));
        assert_eq!(parse_delay_days("7"), Some(7));
        assert_eq!(parse_delay_days("7d"), Some(7));
        assert_eq!(parse_delay_days("2w"), Some(14));
        assert_eq!(parse_delay_days("36h"), None);
        assert_eq!(parse_delay_days("soon"), None);
    }

    #[test]
    fn channel_ids_from_mentions_and_raw() {
        assert_eq!(parse_channel_id("123456"), Some(123_456));
        assert_eq!(parse_channel_id(" <#987> "), Some(987));
        assert_eq!(parse_channel_id("<@987>"), None);
        assert_eq!(parse_channel_id("0"), None);
        assert_eq!(parse_channel_id("general"), None);
    }
}
