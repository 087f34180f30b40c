/// An API call waiting for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub handler: String,
    pub text: String,
}

/// A file whose chunks are still being acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFileTransfer {
    pub file: String,
    pub total: u64,
    pub received: u64,
}

/// In-flight work, split into API and file queues.
///
/// Duplicate entries are allowed. Removal and advancement always act on the
/// first matching entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusTracker {
    api: Vec<PendingOperation>,
    files: Vec<PendingFileTransfer>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_api(&mut self, handler: impl Into<String>, text: impl Into<String>) {
        self.api.push(PendingOperation {
            handler: handler.into(),
            text: text.into(),
        });
    }

    /// Removes the first entry for `handler`. Returns false if none matched.
    pub fn end_api(&mut self, handler: &str) -> bool {
        match self.api.iter().position(|op| op.handler == handler) {
            Some(pos) => {
                self.api.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn begin_file(&mut self, file: impl Into<String>, total: u64) {
        self.files.push(PendingFileTransfer {
            file: file.into(),
            total,
            received: 0,
        });
    }

    /// Counts one acknowledged chunk for `file`; the entry is dropped once
    /// every chunk is in. Returns false if no entry matched.
    pub fn advance_file(&mut self, file: &str) -> bool {
        let Some(pos) = self.files.iter().position(|entry| entry.file == file) else {
            return false;
        };
        self.files[pos].received += 1;
        if self.files[pos].received >= self.files[pos].total {
            self.files.remove(pos);
        }
        true
    }

    /// Removes the first entry for `file` if all of its chunks arrived.
    pub fn end_file(&mut self, file: &str) -> bool {
        match self
            .files
            .iter()
            .position(|entry| entry.file == file && entry.received >= entry.total)
        {
            Some(pos) => {
                self.files.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.api.is_empty() || !self.files.is_empty()
    }

    pub fn pending_api(&self) -> &[PendingOperation] {
        &self.api
    }

    pub fn pending_files(&self) -> &[PendingFileTransfer] {
        &self.files
    }

    /// Human-readable wait lines, one per distinct handler or file name.
    pub fn status_lines(&self) -> Vec<String> {
        let mut handlers: Vec<&str> = Vec::new();
        let mut lines = Vec::new();
        for op in &self.api {
            if !handlers.contains(&op.handler.as_str()) {
                handlers.push(&op.handler);
                lines.push(format!("Waiting for {}.", op.text));
            }
        }
        let mut files: Vec<&str> = Vec::new();
        for entry in &self.files {
            if !files.contains(&entry.file.as_str()) {
                files.push(&entry.file);
                lines.push(format!("Waiting for {}.", entry.file));
            }
        }
        lines
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            busy: self.is_busy(),
            api_pending: self.api.len(),
            files_pending: self.files.len(),
            lines: self.status_lines(),
        }
    }
}

/// What a busy indicator needs to render, derived fresh after every change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub busy: bool,
    pub api_pending: usize,
    pub files_pending: usize,
    pub lines: Vec<String>,
}
