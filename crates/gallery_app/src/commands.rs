use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Context, Result};
use gallery_core::{DomainUpdate, OperationName, StatusSnapshot, DOMAINS};
use gallery_engine::{SyncService, UploadJob, UploadSummary};
use gallery_logging::{gallery_debug, gallery_info};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::cli::Command;
use crate::config::AppConfig;

pub async fn run(command: Command, config_path: &Path, config: AppConfig) -> Result<()> {
    match command {
        Command::Operations => {
            for name in OperationName::ALL {
                let (method, path) = name.route();
                println!("{:<24} {:<6} {}", name.as_str(), method.as_str(), path);
            }
            Ok(())
        }
        Command::Config { write } => {
            println!("{}", config.to_ron()?);
            if write {
                config.save(config_path)?;
                println!("Saved to {}", config_path.display());
            }
            Ok(())
        }
        Command::Dispatch { name, payload } => {
            let service = connect(&config)?;
            dispatch(&service, &name, payload.as_deref()).await
        }
        Command::Upload {
            files,
            description,
            tags,
        } => {
            let service = connect(&config)?;
            let mut jobs = Vec::with_capacity(files.len());
            for file in &files {
                let mut job = UploadJob::from_path(file)
                    .await
                    .with_context(|| format!("cannot read {}", file.display()))?
                    .with_tags(tags.iter().cloned());
                if let Some(description) = &description {
                    job = job.with_description(description.clone());
                }
                jobs.push(job);
            }
            upload(&service, jobs).await
        }
    }
}

fn connect(config: &AppConfig) -> Result<SyncService> {
    gallery_info!("Using backend {}", config.base_url);
    SyncService::connect(config.transport_settings(), config.upload_settings())
        .with_context(|| format!("cannot use backend {}", config.base_url))
}

/// Subscribes to every domain event so whatever the response carries gets
/// printed, not only the key the operation is mapped to.
fn subscribe_all(service: &SyncService) -> mpsc::UnboundedReceiver<DomainUpdate> {
    let (tx, rx) = mpsc::unbounded_channel();
    for entry in DOMAINS.iter() {
        let tx = tx.clone();
        service.subscribe(entry.key, move |update| {
            let _ = tx.send(update.clone());
        });
    }
    rx
}

async fn dispatch(service: &SyncService, name: &str, payload: Option<&str>) -> Result<()> {
    let payload: Option<Value> = payload
        .map(serde_json::from_str)
        .transpose()
        .context("payload is not valid JSON")?;

    let mut updates = subscribe_all(service);
    service.dispatch_now(name, payload).await?;

    // Handlers run before dispatch_now returns, so the channel is complete.
    while let Ok(update) = updates.try_recv() {
        println!("{}:", update.key);
        println!("{}", serde_json::to_string_pretty(&update.value)?);
    }
    print_status(&service.status());
    Ok(())
}

async fn upload(service: &SyncService, jobs: Vec<UploadJob>) -> Result<()> {
    let summary = watch_upload(service, jobs, print_status).await?;
    print_summary(&summary);

    if summary.abandoned > 0 || summary.unacknowledged > 0 {
        bail!(
            "{} of {} chunk(s) were not accepted",
            summary.abandoned + summary.unacknowledged,
            summary.chunks_total
        );
    }
    Ok(())
}

/// Runs one batch, handing every distinct status snapshot to `emit`. The
/// snapshot taken after the batch settled is always the last one emitted.
async fn watch_upload<F>(
    service: &SyncService,
    jobs: Vec<UploadJob>,
    emit: F,
) -> Result<UploadSummary>
where
    F: FnMut(&StatusSnapshot) + Send + 'static,
{
    let emitter = Arc::new(Mutex::new(StatusEmitter { last: None, emit }));
    let mut status = service.watch_status();
    let handle = service.submit(jobs)?;

    let watcher = {
        let emitter = emitter.clone();
        tokio::spawn(async move {
            while status.changed().await.is_ok() {
                let snapshot = status.borrow_and_update().clone();
                gallery_debug!("Status: {:?}", snapshot.lines);
                lock(&emitter).emit(snapshot);
            }
        })
    };

    let summary = handle.wait().await;
    watcher.abort();
    // Wait for the abort so nothing is emitted after the final snapshot.
    let _ = watcher.await;
    lock(&emitter).emit(service.status());
    Ok(summary)
}

struct StatusEmitter<F> {
    last: Option<StatusSnapshot>,
    emit: F,
}

impl<F: FnMut(&StatusSnapshot)> StatusEmitter<F> {
    fn emit(&mut self, snapshot: StatusSnapshot) {
        if self.last.as_ref() != Some(&snapshot) {
            (self.emit)(&snapshot);
            self.last = Some(snapshot);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn print_status(status: &StatusSnapshot) {
    if status.lines.is_empty() {
        println!("Idle.");
    }
    for line in &status.lines {
        println!("{}", line);
    }
}

fn print_summary(summary: &UploadSummary) {
    println!(
        "Batch {}: {}/{} chunk(s) acknowledged, {} unacknowledged, {} abandoned{}",
        summary.batch_id,
        summary.acknowledged,
        summary.chunks_total,
        summary.unacknowledged,
        summary.abandoned,
        if summary.refreshed {
            "; image list refreshed"
        } else {
            ""
        }
    );
}
