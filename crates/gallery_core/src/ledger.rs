use std::collections::BTreeMap;

use crate::ManifestEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// The job still has chunks outstanding.
    Pending { remaining_chunks: u64 },
    /// The job just finished; other jobs are still outstanding.
    JobComplete { remaining_jobs: usize },
    /// The last chunk of the last job just arrived. Reported once per batch.
    BatchComplete,
    /// Acknowledgment for an unknown or already finished job.
    Ignored,
}

/// Client-side count of outstanding chunks per job and jobs per batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchLedger {
    remaining_chunks: BTreeMap<usize, u64>,
    remaining_jobs: usize,
    completed: bool,
}

impl BatchLedger {
    pub fn new(entries: &[ManifestEntry]) -> Self {
        let remaining_chunks: BTreeMap<usize, u64> = entries
            .iter()
            .filter(|entry| entry.chunks > 0)
            .map(|entry| (entry.index, entry.chunks))
            .collect();
        Self {
            remaining_jobs: remaining_chunks.len(),
            remaining_chunks,
            completed: false,
        }
    }

    pub fn acknowledge(&mut self, index: usize) -> LedgerOutcome {
        let Some(remaining) = self.remaining_chunks.get_mut(&index) else {
            return LedgerOutcome::Ignored;
        };
        if *remaining == 0 {
            return LedgerOutcome::Ignored;
        }
        *remaining -= 1;
        if *remaining > 0 {
            return LedgerOutcome::Pending {
                remaining_chunks: *remaining,
            };
        }
        self.remaining_jobs -= 1;
        if self.remaining_jobs > 0 {
            return LedgerOutcome::JobComplete {
                remaining_jobs: self.remaining_jobs,
            };
        }
        self.completed = true;
        LedgerOutcome::BatchComplete
    }

    pub fn remaining_jobs(&self) -> usize {
        self.remaining_jobs
    }

    pub fn remaining_chunks(&self, index: usize) -> Option<u64> {
        self.remaining_chunks.get(&index).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }
}
