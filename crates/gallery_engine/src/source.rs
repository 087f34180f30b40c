use std::io::{self, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Random-access bytes of a file selected for upload.
#[async_trait::async_trait]
pub trait FileSource: Send + Sync {
    fn size(&self) -> u64;

    async fn read_range(&self, range: Range<u64>) -> io::Result<Bytes>;
}

/// File contents already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Bytes,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

#[async_trait::async_trait]
impl FileSource for MemorySource {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn read_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        let len = self.bytes.len() as u64;
        if range.start > range.end || range.end > len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("range {range:?} outside {len} bytes"),
            ));
        }
        Ok(self.bytes.slice(range.start as usize..range.end as usize))
    }
}

/// A file on disk. The size is captured once when the source is opened.
#[derive(Debug, Clone)]
pub struct PathSource {
    path: PathBuf,
    size: u64,
}

impl PathSource {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(Self {
            path,
            size: meta.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl FileSource for PathSource {
    fn size(&self) -> u64 {
        self.size
    }

    async fn read_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(range.start)).await?;
        let mut buf = vec![0u8; (range.end - range.start) as usize];
        file.read_exact(&mut buf).await?;
        Ok(Bytes::from(buf))
    }
}
