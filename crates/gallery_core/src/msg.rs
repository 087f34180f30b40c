use serde_json::{Map, Value};

use crate::OperationName;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A dispatch for this operation is about to hit the network.
    DispatchStarted(OperationName),
    /// A JSON object arrived from the backend.
    ResponseReceived { body: Map<String, Value> },
    /// The first chunk of a file is about to be sent.
    FileTransferStarted { file: String, total: u64 },
    /// The server acknowledged one chunk of a file.
    ChunkAcknowledged { file: String },
}
