/// Retries granted to each chunk after its first attempt.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Lifecycle of one chunk send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// First attempt not yet made.
    Pending,
    /// Previous attempt failed; the next one runs with this many retries left.
    Retrying(u32),
    /// Server acknowledged the chunk.
    Succeeded,
    /// Server answered without progress information; nothing more to do.
    Unacknowledged,
    /// Every retry failed; the chunk is dropped.
    Exhausted,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransferState::Succeeded | TransferState::Unacknowledged | TransferState::Exhausted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    Acknowledged,
    Unacknowledged,
    Failed,
}

/// Bounded-retry bookkeeping for a single chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkAttempts {
    state: TransferState,
    retries_remaining: u32,
    attempts: u32,
}

impl ChunkAttempts {
    pub fn new(retries_remaining: u32) -> Self {
        Self {
            state: TransferState::Pending,
            retries_remaining,
            attempts: 0,
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retries_remaining(&self) -> u32 {
        self.retries_remaining
    }

    /// Applies the outcome of one attempt and returns the new state.
    pub fn record(&mut self, result: AttemptResult) -> TransferState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.attempts += 1;
        self.state = match result {
            AttemptResult::Acknowledged => TransferState::Succeeded,
            AttemptResult::Unacknowledged => TransferState::Unacknowledged,
            AttemptResult::Failed if self.retries_remaining > 0 => {
                self.retries_remaining -= 1;
                TransferState::Retrying(self.retries_remaining)
            }
            AttemptResult::Failed => TransferState::Exhausted,
        };
        self.state
    }
}

impl Default for ChunkAttempts {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_LIMIT)
    }
}
