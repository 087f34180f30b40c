use std::sync::Arc;

use gallery_core::{DomainUpdate, ResponseStore, StatusSnapshot, SubscriptionId};
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use crate::hub::SyncHub;
use crate::{
    DispatchError, Dispatcher, ReqwestTransport, SubmitError, TransferChunker, Transport,
    TransportError, TransportSettings, UploadCoordinator, UploadHandle, UploadJob, UploadSettings,
};

/// Entry point for UI collaborators: issue operations, read cached domain
/// data, subscribe to updates, upload files and watch the busy signal.
///
/// Cheap to clone; clones share the same store and tracker.
#[derive(Clone)]
pub struct SyncService {
    hub: Arc<SyncHub>,
    dispatcher: Dispatcher,
    uploads: UploadCoordinator,
}

impl SyncService {
    pub fn new(transport: Arc<dyn Transport>, upload: UploadSettings) -> Self {
        let hub = Arc::new(SyncHub::new());
        let dispatcher = Dispatcher::new(hub.clone(), transport.clone());
        let chunker = TransferChunker::new(transport, upload.retry_delay);
        let uploads = UploadCoordinator::new(hub.clone(), chunker, dispatcher.clone(), upload);
        Self {
            hub,
            dispatcher,
            uploads,
        }
    }

    /// Builds a service on top of the HTTP transport.
    pub fn connect(
        settings: TransportSettings,
        upload: UploadSettings,
    ) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(settings)?;
        Ok(Self::new(Arc::new(transport), upload))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn uploads(&self) -> &UploadCoordinator {
        &self.uploads
    }

    pub fn dispatch(&self, name: &str, payload: Option<Value>) {
        self.dispatcher.dispatch(name, payload);
    }

    pub async fn dispatch_now(&self, name: &str, payload: Option<Value>) -> Result<(), DispatchError> {
        self.dispatcher.dispatch_now(name, payload).await
    }

    pub fn submit(&self, jobs: Vec<UploadJob>) -> Result<UploadHandle, SubmitError> {
        self.uploads.submit(jobs)
    }

    /// Last value received for `key`, or `None` if it was never loaded.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.hub.get(key)
    }

    pub fn snapshot(&self) -> ResponseStore {
        self.hub.store()
    }

    /// Registers a synchronous handler for `event`. Handlers only see values
    /// set after registration.
    pub fn subscribe<F>(&self, event: impl AsRef<str>, handler: F) -> SubscriptionId
    where
        F: Fn(&DomainUpdate) + Send + Sync + 'static,
    {
        self.hub.subscribe(event.as_ref(), handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hub.unsubscribe(id)
    }

    /// Forwards updates for `event` into a channel. The subscription ends
    /// when [`SyncService::unsubscribe`] is called with the returned id.
    pub fn subscribe_channel(
        &self,
        event: impl AsRef<str>,
    ) -> (SubscriptionId, mpsc::UnboundedReceiver<DomainUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.subscribe(event, move |update| {
            let _ = tx.send(update.clone());
        });
        (id, rx)
    }

    pub fn status(&self) -> StatusSnapshot {
        self.hub.status()
    }

    pub fn watch_status(&self) -> watch::Receiver<StatusSnapshot> {
        self.hub.watch_status()
    }

    /// Resolves once neither API calls nor file transfers are pending.
    /// Never resolves while a failed operation is still listed.
    pub async fn wait_idle(&self) {
        let mut rx = self.hub.watch_status();
        let _ = rx.wait_for(|status| !status.busy).await;
    }
}
