//! Gallery sync engine: HTTP transport, operation dispatch, chunked uploads
//! and the shared service object UI code talks to.
mod chunker;
mod coordinator;
mod dispatcher;
mod hub;
mod persist;
mod service;
mod source;
mod transport;
mod types;

pub use chunker::{ChunkOutcome, TransferChunker};
pub use coordinator::{
    ChunkReport, UploadCoordinator, UploadHandle, UploadJob, UploadSettings, UploadSummary,
};
pub use dispatcher::Dispatcher;
pub use persist::{ensure_dir, write_atomically, PersistError};
pub use service::SyncService;
pub use source::{FileSource, MemorySource, PathSource};
pub use transport::{ChunkUpload, ReqwestTransport, Transport, TransportSettings};
pub use types::{DispatchError, FailureKind, SubmitError, TransportError};
