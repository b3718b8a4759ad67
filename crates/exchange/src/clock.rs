/// Source of the current unix time in seconds, used to evaluate order
/// expiration.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Reads the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-1970 system clocks saturate to zero.
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
