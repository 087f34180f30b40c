use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

use gallery_core::{AttemptResult, ChunkAttempts, TransferState, UploadProgressReport};
use gallery_logging::{gallery_debug, gallery_error, gallery_warn};
use tokio::sync::oneshot;

use crate::{ChunkUpload, Transport};

/// Result of driving one chunk to a terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOutcome {
    pub attempts: ChunkAttempts,
    pub report: Option<UploadProgressReport>,
}

impl ChunkOutcome {
    pub fn state(&self) -> TransferState {
        self.attempts.state()
    }
}

/// Sends chunks to the fixed upload endpoint with bounded retry.
#[derive(Clone)]
pub struct TransferChunker {
    transport: Arc<dyn Transport>,
    retry_delay: Duration,
}

impl TransferChunker {
    pub fn new(transport: Arc<dyn Transport>, retry_delay: Duration) -> Self {
        Self {
            transport,
            retry_delay,
        }
    }

    /// Attempts the upload once, then again for every retry a failure
    /// earns. A well-formed body without progress information ends the
    /// chunk without retry.
    pub async fn send(&self, chunk: ChunkUpload, retries_remaining: u32) -> ChunkOutcome {
        self.send_signalling(chunk, retries_remaining, None).await
    }

    /// Like [`TransferChunker::send`], but fires `started` once the first
    /// attempt has been handed to the transport and polled, before awaiting
    /// its response.
    pub async fn send_signalling(
        &self,
        chunk: ChunkUpload,
        retries_remaining: u32,
        mut started: Option<oneshot::Sender<()>>,
    ) -> ChunkOutcome {
        let mut attempts = ChunkAttempts::new(retries_remaining);
        loop {
            let mut attempt = self.transport.upload_chunk(chunk.clone());
            let first_poll = futures_util::poll!(&mut attempt);
            if let Some(started) = started.take() {
                let _ = started.send(());
            }
            let response = match first_poll {
                Poll::Ready(response) => response,
                Poll::Pending => attempt.await,
            };

            let (result, report) = match response {
                Ok(body) => match UploadProgressReport::from_body(&body) {
                    Some(report) => (AttemptResult::Acknowledged, Some(report)),
                    None => {
                        gallery_debug!(
                            "Upload response for {} carried no progress; ignoring",
                            chunk.file_name
                        );
                        (AttemptResult::Unacknowledged, None)
                    }
                },
                Err(err) => {
                    gallery_warn!("Chunk upload for {} failed: {}", chunk.file_name, err);
                    (AttemptResult::Failed, None)
                }
            };

            match attempts.record(result) {
                TransferState::Retrying(left) => {
                    gallery_debug!(
                        "Retrying chunk of {} ({} retries left after this one)",
                        chunk.file_name,
                        left
                    );
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                TransferState::Exhausted => {
                    gallery_error!(
                        "Chunk upload failed: {} after {} attempt(s); {}",
                        chunk.file_name,
                        attempts.attempts(),
                        chunk.info
                    );
                    return ChunkOutcome { attempts, report };
                }
                _ => return ChunkOutcome { attempts, report },
            }
        }
    }
}
