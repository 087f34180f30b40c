use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-side chunk size of the gallery backend (1 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// `ceil(size / chunk_size)`. A zero-byte file has no chunks.
pub fn chunk_count(size: u64, chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        return 0;
    }
    size.div_ceil(chunk_size)
}

/// Contiguous byte ranges covering `[0, size)`, the last one clipped.
pub fn chunk_ranges(size: u64, chunk_size: u64) -> impl Iterator<Item = Range<u64>> {
    let count = chunk_count(size, chunk_size);
    (0..count).map(move |n| {
        let start = n * chunk_size;
        start..(start + chunk_size).min(size)
    })
}

/// Public fields of one upload job, shared with the server on every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub chunks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ManifestEntry {
    /// Blank descriptions and empty tag lists are left out of the manifest.
    pub fn new(
        index: usize,
        name: impl Into<String>,
        size: u64,
        chunk_size: u64,
        description: Option<&str>,
        tags: &[String],
    ) -> Self {
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned);
        let tags = (!tags.is_empty()).then(|| tags.to_vec());
        Self {
            index,
            name: name.into(),
            size,
            chunks: chunk_count(size, chunk_size),
            description,
            tags,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPosition {
    pub index: usize,
    pub chunk: u64,
}

/// JSON carried in the `info` field of each chunk upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkInfo<'a> {
    pub info: &'a [ManifestEntry],
    pub current: ChunkPosition,
}

/// One chunk ready to be sent: where its bytes live and the batch context.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkUnit {
    pub byte_range: Range<u64>,
    pub manifest: Arc<[ManifestEntry]>,
    pub current: ChunkPosition,
}

impl ChunkUnit {
    pub fn info_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&ChunkInfo {
            info: &self.manifest,
            current: self.current,
        })
    }

    pub fn len(&self) -> u64 {
        self.byte_range.end - self.byte_range.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Manifest entry this chunk belongs to.
    pub fn entry(&self) -> Option<&ManifestEntry> {
        self.manifest
            .iter()
            .find(|entry| entry.index == self.current.index)
    }
}

/// Chunk units of one job, in increasing chunk order.
pub fn plan_chunks(
    entry: &ManifestEntry,
    manifest: Arc<[ManifestEntry]>,
    chunk_size: u64,
) -> impl Iterator<Item = ChunkUnit> {
    let index = entry.index;
    chunk_ranges(entry.size, chunk_size)
        .enumerate()
        .map(move |(n, byte_range)| ChunkUnit {
            byte_range,
            manifest: manifest.clone(),
            current: ChunkPosition {
                index,
                chunk: n as u64,
            },
        })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileProgress {
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chunks: Option<u64>,
    pub progress: f64,
}

/// Body of a successful chunk upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadProgressReport {
    pub progress: Vec<FileProgress>,
    pub current_file: Option<String>,
}

impl UploadProgressReport {
    /// `None` unless the body carries both `progress` and `current_file`.
    pub fn from_body(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        let progress = object.get("progress")?;
        let current_file = object.get("current_file")?;
        let progress = serde_json::from_value(progress.clone()).ok()?;
        Some(Self {
            progress,
            current_file: current_file.as_str().map(ToOwned::to_owned),
        })
    }

    /// True when the server reports every file of the batch at 100%.
    /// An empty list never counts as complete.
    pub fn all_complete(&self) -> bool {
        !self.progress.is_empty() && self.progress.iter().all(|file| file.progress >= 100.0)
    }
}
