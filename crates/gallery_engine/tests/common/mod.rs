#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use gallery_core::{domain_for, Method, OperationDescriptor};
use gallery_engine::{ChunkUpload, FailureKind, Transport, TransportError};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Request {
        method: Method,
        path: String,
        body: Option<Value>,
    },
    Upload {
        file_name: String,
        info: Value,
        len: usize,
    },
}

/// In-memory transport with per-path responses and per-file upload scripts.
#[derive(Default)]
pub struct ScriptedTransport {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<HashMap<String, Result<Value, TransportError>>>,
    uploads: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(body));
    }

    pub fn fail(&self, path: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(network_error()));
    }

    /// Queues outcomes for the next uploads of `file_name`; once drained,
    /// uploads are acknowledged.
    pub fn script_upload(&self, file_name: &str, outcomes: Vec<Result<Value, TransportError>>) {
        self.uploads
            .lock()
            .unwrap()
            .insert(file_name.to_string(), outcomes.into());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn request_calls(&self) -> Vec<(Method, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Request { method, path, .. } => Some((method, path)),
                Call::Upload { .. } => None,
            })
            .collect()
    }

    pub fn upload_calls(&self, file_name: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload {
                    file_name: name,
                    info,
                    ..
                } if name == file_name => Some(info),
                _ => None,
            })
            .collect()
    }
}

pub fn network_error() -> TransportError {
    TransportError::new(FailureKind::Network, "connection reset")
}

/// `{<first domain of the operation>: {}}`, enough to clear its status entry.
fn default_reply(descriptor: &OperationDescriptor) -> Value {
    let mut body = serde_json::Map::new();
    if let Some(entry) = domain_for(descriptor.name) {
        body.insert(entry.key.as_str().to_string(), json!({}));
    }
    Value::Object(body)
}

pub fn ack(file_name: &str) -> Value {
    json!({
        "progress": [{"name": file_name, "progress": 100.0}],
        "current_file": file_name
    })
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, descriptor: &OperationDescriptor) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(Call::Request {
            method: descriptor.method,
            path: descriptor.path.to_string(),
            body: descriptor.body.clone(),
        });
        self.responses
            .lock()
            .unwrap()
            .get(descriptor.path)
            .cloned()
            .unwrap_or_else(|| Ok(default_reply(descriptor)))
    }

    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(Call::Upload {
            file_name: chunk.file_name.clone(),
            info: serde_json::from_str(&chunk.info).unwrap(),
            len: chunk.bytes.len(),
        });
        let scripted = self
            .uploads
            .lock()
            .unwrap()
            .get_mut(&chunk.file_name)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(ack(&chunk.file_name)))
    }
}
