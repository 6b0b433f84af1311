use std::time::Duration;

/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Milliseconds elapsed between `since_unix_ms` and `now_unix_ms`, saturating at zero
/// when the clock moved backwards.
pub fn elapsed_ms_since(since_unix_ms: u64, now_unix_ms: u64) -> u64 {
    now_unix_ms.saturating_sub(since_unix_ms)
}

/// Returns true when a value stamped at `stamped_unix_ms` is still younger than `ttl`.
pub fn is_within_ttl(stamped_unix_ms: u64, now_unix_ms: u64, ttl: Duration) -> bool {
    let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    elapsed_ms_since(stamped_unix_ms, now_unix_ms) < ttl_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_elapsed_ms_saturates_when_clock_moves_backwards() {
        assert_eq!(elapsed_ms_since(1_000, 1_500), 500);
        assert_eq!(elapsed_ms_since(2_000, 1_500), 0);
    }

    #[test]
    fn unit_is_within_ttl_is_exclusive_at_the_boundary() {
        let ttl = Duration::from_secs(2);
        assert!(is_within_ttl(10_000, 10_000, ttl));
        assert!(is_within_ttl(10_000, 11_999, ttl));
        assert!(!is_within_ttl(10_000, 12_000, ttl));
    }

    #[test]
    fn unit_current_unix_timestamp_ms_is_after_2020() {
        assert!(current_unix_timestamp_ms() > 1_577_836_800_000);
    }
}
