use std::time::Duration;

/// Outcome of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutVerdict {
    /// Below the threshold, carry on.
    Continue,
    /// Threshold reached. The caller should refuse further attempts for `timeout`.
    LockedOut { timeout: Duration },
}

/// Consecutive failed attempts, together with the policy they are checked against.
///
/// This is a plain value: operations take it and hand back the next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutState {
    failed_attempts: u32,
    threshold: u32,
    timeout: Duration,
}

impl LockoutState {
    /// A threshold of zero is treated as one.
    pub fn new(threshold: u32, timeout: Duration) -> Self {
        Self {
            failed_attempts: 0,
            threshold: threshold.max(1),
            timeout,
        }
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Counts one failure. Reaching the threshold locks out and starts the count over.
    #[must_use]
    pub fn record_failure(self) -> (Self, LockoutVerdict) {
        let failed_attempts = self.failed_attempts + 1;
        if failed_attempts >= self.threshold {
            let verdict = LockoutVerdict::LockedOut {
                timeout: self.timeout,
            };
            (self.reset(), verdict)
        } else {
            (
                Self {
                    failed_attempts,
                    ..self
                },
                LockoutVerdict::Continue,
            )
        }
    }

    #[must_use]
    pub fn record_success(self) -> Self {
        self.reset()
    }

    fn reset(self) -> Self {
        Self {
            failed_attempts: 0,
            ..self
        }
    }
}
