//! Gallery sync core: pure data model for the request/response cache,
//! status tracking and chunked-upload planning. No IO lives here.
mod bus;
mod domain;
mod effect;
mod ledger;
mod msg;
mod operation;
mod state;
mod status;
mod store;
mod transfer;
mod update;
mod upload;

pub use bus::{DomainUpdate, EventBus, EventHandler, SubscriptionId};
pub use domain::{domain_for, DomainEntry, DomainKey, DOMAINS};
pub use effect::Effect;
pub use ledger::{BatchLedger, LedgerOutcome};
pub use msg::Msg;
pub use operation::{
    describe, Method, OperationDescriptor, OperationName, UnknownOperation, ACCEPT_JSON,
    CONTENT_TYPE_JSON, UPLOAD_PATH,
};
pub use state::SyncState;
pub use status::{PendingFileTransfer, PendingOperation, StatusSnapshot, StatusTracker};
pub use store::ResponseStore;
pub use transfer::{AttemptResult, ChunkAttempts, TransferState, DEFAULT_RETRY_LIMIT};
pub use update::update;
pub use upload::{
    chunk_count, chunk_ranges, plan_chunks, ChunkInfo, ChunkPosition, ChunkUnit, FileProgress,
    ManifestEntry, UploadProgressReport, DEFAULT_CHUNK_SIZE,
};
