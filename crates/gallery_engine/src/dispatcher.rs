use std::sync::Arc;

use gallery_core::{describe, Msg};
use gallery_logging::{gallery_debug, gallery_error, gallery_warn};
use serde_json::Value;

use crate::hub::SyncHub;
use crate::{DispatchError, Transport};

/// Issues named operations and folds their responses into the hub.
#[derive(Clone)]
pub struct Dispatcher {
    hub: Arc<SyncHub>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub(crate) fn new(hub: Arc<SyncHub>, transport: Arc<dyn Transport>) -> Self {
        Self { hub, transport }
    }

    /// Fire-and-forget form of [`Dispatcher::dispatch_now`]. Results arrive
    /// only through domain events. Must be called inside a Tokio runtime.
    pub fn dispatch(&self, name: &str, payload: Option<Value>) {
        let dispatcher = self.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            // Failures are already logged.
            let _ = dispatcher.dispatch_now(&name, payload).await;
        });
    }

    /// Runs one operation to completion.
    ///
    /// On failure the pending status entry is left in place; the busy
    /// indicator keeps showing it.
    pub async fn dispatch_now(&self, name: &str, payload: Option<Value>) -> Result<(), DispatchError> {
        let Some(descriptor) = describe(name, payload) else {
            gallery_warn!("Unknown API call {:?}", name);
            return Err(DispatchError::UnknownOperation(name.to_string()));
        };
        let operation = descriptor.name;

        self.hub.apply(Msg::DispatchStarted(operation));
        gallery_debug!(
            "Dispatch {} {} {}",
            operation,
            descriptor.method,
            descriptor.path
        );

        let body = match self.transport.request(&descriptor).await {
            Ok(body) => body,
            Err(source) => {
                gallery_error!("{} failed: {}", operation, source);
                return Err(DispatchError::Transport { operation, source });
            }
        };

        match body {
            Value::Object(body) => {
                gallery_debug!("{} returned {} key(s)", operation, body.len());
                self.hub.apply(Msg::ResponseReceived { body });
                Ok(())
            }
            other => {
                gallery_error!(
                    "{} returned a non-object body: {}",
                    operation,
                    json_kind(&other)
                );
                Err(DispatchError::UnexpectedBody { operation })
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
