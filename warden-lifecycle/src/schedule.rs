//! Pass scheduling. The interval is re-read on every check, so a changed
//! setting applies at the next check.

/// Whether a new pass should start, given when the last one finished.
pub fn pass_is_due(last_finished_at: Option<u64>, interval_minutes: u64, now: u64) -> bool {
    seconds_until_due(last_finished_at, interval_minutes, now) == 0
}

pub fn seconds_until_due(last_finished_at: Option<u64>, interval_minutes: u64, now: u64) -> u64 {
    let Some(last) = last_finished_at else {
        return 0;
    };

    let interval_secs = interval_minutes.max(1).saturating_mul(60);
    last.saturating_add(interval_secs).saturating_sub(now)
}

#[cfg(test)]
mod tests {
    use super::{pass_is_due, seconds_until_due};

    #[test]
    fn first_pass_is_due_immediately() {
        assert!(pass_is_due(None, 60, 1_000));
    }

    #[test]
    fn waits_for_full_interval() {
        assert!(!pass_is_due(Some(1_000), 60, 1_000 + 59 * 60));
        assert!(pass_is_due(Some(1_000), 60, 1_000 + 60 * 60));
        assert_eq!(seconds_until_due(Some(1_000), 60, 1_000 + 30 * 60), 30 * 60);
    }

    #[test]
    fn shortened_interval_applies_on_next_check() {
        let last = 10_000;
        let now = last + 20 * 60;

        assert!(!pass_is_due(Some(last), 60, now));
        assert!(pass_is_due(Some(last), 15, now));
    }

    #[test]
    fn zero_interval_is_treated_as_one_minute() {
        assert!(!pass_is_due(Some(100), 0, 130));
        assert!(pass_is_due(Some(100), 0, 160));
    }

    #[test]
    fn clock_skew_does_not_underflow() {
        assert_eq!(seconds_until_due(Some(5_000), 1, 100), 4_960);
    }
}
