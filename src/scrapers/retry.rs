//! Retry bookkeeping for page fetches, kept free of timers and I/O.
//!
//! The fetcher drives the loop; this module only decides what comes next.

/// Where a fetch currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to make attempt number `attempt` (0 is the first request).
    Attempting { attempt: u32 },
    /// Waiting before attempt number `attempt`.
    Backoff { attempt: u32 },
    Succeeded,
    /// Terminal. `exhausted` is set when the retry budget ran out,
    /// as opposed to a non-retryable failure.
    Failed { attempts: u32, exhausted: bool },
}

/// What just happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryEvent {
    Success,
    RetryableFailure,
    FatalFailure,
    BackoffElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn start(&self) -> RetryState {
        RetryState::Attempting { attempt: 0 }
    }

    /// Total number of requests this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn transition(&self, state: RetryState, event: RetryEvent) -> RetryState {
        match (state, event) {
            (RetryState::Attempting { .. }, RetryEvent::Success) => RetryState::Succeeded,
            (RetryState::Attempting { attempt }, RetryEvent::FatalFailure) => RetryState::Failed {
                attempts: attempt + 1,
                exhausted: false,
            },
            (RetryState::Attempting { attempt }, RetryEvent::RetryableFailure) => {
                if attempt < self.max_retries {
                    RetryState::Backoff {
                        attempt: attempt + 1,
                    }
                } else {
                    RetryState::Failed {
                        attempts: attempt + 1,
                        exhausted: true,
                    }
                }
            }
            (RetryState::Backoff { attempt }, RetryEvent::BackoffElapsed) => {
                RetryState::Attempting { attempt }
            }
            // Terminal states absorb everything; events that make no sense
            // for the current state leave it unchanged.
            (state, _) => state,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}
