use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use gallery_core::{
    plan_chunks, BatchLedger, ChunkUnit, LedgerOutcome, ManifestEntry, Msg, OperationName,
    TransferState, DEFAULT_CHUNK_SIZE, DEFAULT_RETRY_LIMIT,
};
use gallery_logging::{gallery_debug, gallery_error, gallery_info};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::hub::SyncHub;
use crate::{
    ChunkUpload, Dispatcher, FileSource, MemorySource, PathSource, SubmitError, TransferChunker,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub chunk_size: u64,
    pub retry_limit: u32,
    pub retry_delay: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry_limit: DEFAULT_RETRY_LIMIT,
            retry_delay: Duration::ZERO,
        }
    }
}

/// One file selected for upload, with the metadata the gallery stores
/// alongside it.
#[derive(Clone)]
pub struct UploadJob {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub source: Arc<dyn FileSource>,
}

impl UploadJob {
    pub fn new(name: impl Into<String>, source: Arc<dyn FileSource>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tags: Vec::new(),
            source,
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<bytes::Bytes>) -> Self {
        Self::new(name, Arc::new(MemorySource::new(bytes)))
    }

    /// Uses the file name component of `path` as the upload name.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let source = PathSource::open(path).await?;
        Ok(Self::new(name, Arc::new(source)))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Per-chunk record kept until the batch settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    pub index: usize,
    pub chunk: u64,
    pub state: TransferState,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadSummary {
    pub batch_id: u64,
    pub chunks_total: u64,
    pub acknowledged: u64,
    pub unacknowledged: u64,
    /// Retries exhausted, or the bytes could not be read.
    pub abandoned: u64,
    /// The whole batch was acknowledged and the image list refresh succeeded.
    pub refreshed: bool,
}

/// Returned by [`UploadCoordinator::submit`]. Dropping it does not cancel
/// anything; the batch keeps running in the background.
pub struct UploadHandle {
    batch_id: u64,
    chunks_total: u64,
    jobs: Vec<JoinHandle<Vec<JoinHandle<ChunkReport>>>>,
    refreshed: Arc<AtomicBool>,
}

impl UploadHandle {
    pub fn batch_id(&self) -> u64 {
        self.batch_id
    }

    /// Waits for every chunk of the batch to reach a terminal state,
    /// including the trailing image list refresh.
    pub async fn wait(self) -> UploadSummary {
        let mut summary = UploadSummary {
            batch_id: self.batch_id,
            chunks_total: self.chunks_total,
            ..UploadSummary::default()
        };

        let mut chunk_tasks = Vec::new();
        for job in join_all(self.jobs).await {
            match job {
                Ok(tasks) => chunk_tasks.extend(tasks),
                Err(err) => gallery_error!("Upload job task failed: {}", err),
            }
        }

        let mut settled = 0;
        for report in join_all(chunk_tasks).await {
            match report {
                Ok(report) => {
                    settled += 1;
                    match report.state {
                        TransferState::Succeeded => summary.acknowledged += 1,
                        TransferState::Unacknowledged => summary.unacknowledged += 1,
                        _ => summary.abandoned += 1,
                    }
                }
                Err(err) => gallery_error!("Chunk task failed: {}", err),
            }
        }
        // Chunks that never produced a report (job or chunk task died).
        summary.abandoned += self.chunks_total.saturating_sub(settled);

        summary.refreshed = self.refreshed.load(Ordering::Acquire);
        summary
    }
}

/// Splits upload batches into chunk sends and triggers the image list
/// refresh once the whole batch is acknowledged.
#[derive(Clone)]
pub struct UploadCoordinator {
    hub: Arc<SyncHub>,
    chunker: TransferChunker,
    dispatcher: Dispatcher,
    settings: UploadSettings,
    next_batch: Arc<AtomicU64>,
}

impl UploadCoordinator {
    pub(crate) fn new(
        hub: Arc<SyncHub>,
        chunker: TransferChunker,
        dispatcher: Dispatcher,
        settings: UploadSettings,
    ) -> Self {
        Self {
            hub,
            chunker,
            dispatcher,
            settings,
            next_batch: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Validates the batch, registers every file with the status tracker and
    /// starts sending. Must be called inside a Tokio runtime.
    pub fn submit(&self, jobs: Vec<UploadJob>) -> Result<UploadHandle, SubmitError> {
        let chunk_size = self.settings.chunk_size;
        if chunk_size == 0 {
            return Err(SubmitError::InvalidChunkSize);
        }
        if jobs.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }
        if let Some(empty) = jobs.iter().find(|job| job.source.size() == 0) {
            return Err(SubmitError::EmptyFile {
                name: empty.name.clone(),
            });
        }

        let entries: Vec<ManifestEntry> = jobs
            .iter()
            .enumerate()
            .map(|(index, job)| {
                ManifestEntry::new(
                    index,
                    job.name.clone(),
                    job.source.size(),
                    chunk_size,
                    job.description.as_deref(),
                    &job.tags,
                )
            })
            .collect();
        let batch = Arc::new(BatchProgress {
            ledger: Mutex::new(BatchLedger::new(&entries)),
            refreshed: Arc::new(AtomicBool::new(false)),
        });
        let chunks_total = entries.iter().map(|entry| entry.chunks).sum();
        let manifest: Arc<[ManifestEntry]> = Arc::from(entries);
        let batch_id = self.next_batch.fetch_add(1, Ordering::Relaxed);

        gallery_info!(
            "Upload batch {}: {} file(s), {} chunk(s) of {} bytes",
            batch_id,
            manifest.len(),
            chunks_total,
            chunk_size
        );

        for entry in manifest.iter() {
            self.hub.apply(Msg::FileTransferStarted {
                file: entry.name.clone(),
                total: entry.chunks,
            });
        }

        let job_tasks = jobs
            .into_iter()
            .zip(manifest.iter().cloned())
            .map(|(job, entry)| {
                let coordinator = self.clone();
                let manifest = manifest.clone();
                let batch = batch.clone();
                tokio::spawn(async move {
                    coordinator
                        .run_job(batch_id, job, entry, manifest, batch)
                        .await
                })
            })
            .collect();

        Ok(UploadHandle {
            batch_id,
            chunks_total,
            jobs: job_tasks,
            refreshed: batch.refreshed.clone(),
        })
    }

    /// Reads and launches the chunks of one job in order. Each send runs on
    /// its own task; the next chunk is read only after the previous one has
    /// reached the transport, but does not wait for its ack.
    async fn run_job(
        &self,
        batch_id: u64,
        job: UploadJob,
        entry: ManifestEntry,
        manifest: Arc<[ManifestEntry]>,
        batch: Arc<BatchProgress>,
    ) -> Vec<JoinHandle<ChunkReport>> {
        let mut tasks = Vec::with_capacity(entry.chunks as usize);
        for unit in plan_chunks(&entry, manifest, self.settings.chunk_size) {
            let upload = match self.prepare(&job, &unit).await {
                Ok(upload) => upload,
                Err(message) => {
                    gallery_error!(
                        "Skipping chunk {} of {}: {}",
                        unit.current.chunk,
                        job.name,
                        message
                    );
                    let report = ChunkReport {
                        index: unit.current.index,
                        chunk: unit.current.chunk,
                        state: TransferState::Exhausted,
                        attempts: 0,
                    };
                    tasks.push(tokio::spawn(async move { report }));
                    continue;
                }
            };

            let coordinator = self.clone();
            let name = job.name.clone();
            let batch = batch.clone();
            let (started_tx, started_rx) = oneshot::channel();
            tasks.push(tokio::spawn(async move {
                coordinator
                    .send_chunk(batch_id, name, unit, upload, batch, started_tx)
                    .await
            }));
            // Err means the task ended without sending; nothing left to order.
            let _ = started_rx.await;
        }
        tasks
    }

    async fn prepare(&self, job: &UploadJob, unit: &ChunkUnit) -> Result<ChunkUpload, String> {
        let bytes = job
            .source
            .read_range(unit.byte_range.clone())
            .await
            .map_err(|err| err.to_string())?;
        ChunkUpload::from_unit(unit, bytes).map_err(|err| err.to_string())
    }

    async fn send_chunk(
        &self,
        batch_id: u64,
        name: String,
        unit: ChunkUnit,
        upload: ChunkUpload,
        batch: Arc<BatchProgress>,
        started: oneshot::Sender<()>,
    ) -> ChunkReport {
        let outcome = self
            .chunker
            .send_signalling(upload, self.settings.retry_limit, Some(started))
            .await;
        let report = ChunkReport {
            index: unit.current.index,
            chunk: unit.current.chunk,
            state: outcome.state(),
            attempts: outcome.attempts.attempts(),
        };
        if report.state != TransferState::Succeeded {
            return report;
        }

        self.hub.apply(Msg::ChunkAcknowledged { file: name.clone() });
        if let Some(server) = &outcome.report {
            gallery_debug!(
                "Server progress after {} chunk {}: {} file(s), all complete: {}",
                name,
                unit.current.chunk,
                server.progress.len(),
                server.all_complete()
            );
        }

        let acknowledged = batch
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .acknowledge(unit.current.index);
        if acknowledged == LedgerOutcome::BatchComplete {
            gallery_info!("Upload batch {} complete; refreshing image list", batch_id);
            // Failures are logged by the dispatcher.
            let refreshed = self
                .dispatcher
                .dispatch_now(OperationName::ImageData.as_str(), None)
                .await
                .is_ok();
            batch.refreshed.store(refreshed, Ordering::Release);
        }
        report
    }
}

/// Shared between the chunk tasks of one batch.
struct BatchProgress {
    ledger: Mutex<BatchLedger>,
    refreshed: Arc<AtomicBool>,
}
