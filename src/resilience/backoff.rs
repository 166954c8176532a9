//! Jittered exponential delay between attempts.

use std::time::Duration;

use rand::Rng;

/// Delay before the attempt after `attempt`: `base * 2^(attempt-1)`, capped
/// at `max`, plus up to half of that again as jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let Some(exponent) = attempt.checked_sub(1) else {
        return Duration::ZERO;
    };

    let delay = base_ms
        .saturating_mul(2u64.saturating_pow(exponent))
        .min(max_ms);
    let jitter = match delay / 2 {
        0 => 0,
        half => rand::thread_rng().gen_range(0..half),
    };

    Duration::from_millis(delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_per_attempt_within_jitter() {
        let first = calculate_backoff(1, 100, 2000).as_millis();
        assert!((100..150).contains(&first));

        let second = calculate_backoff(2, 100, 2000).as_millis();
        assert!((200..300).contains(&second));
    }

    #[test]
    fn capped_at_max_plus_jitter() {
        let delay = calculate_backoff(10, 100, 1000).as_millis();
        assert!((1000..1500).contains(&delay));
    }

    #[test]
    fn attempt_zero_waits_nothing() {
        assert_eq!(calculate_backoff(0, 100, 1000), Duration::ZERO);
    }
}
