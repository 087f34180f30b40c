use crate::{domain_for, DomainKey, DomainUpdate, Effect, Msg, SyncState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SyncState, msg: Msg) -> (SyncState, Vec<Effect>) {
    let effects = match msg {
        Msg::DispatchStarted(operation) => match domain_for(operation) {
            Some(entry) => {
                state
                    .tracker_mut()
                    .begin_api(entry.key.as_str(), entry.description);
                vec![Effect::StatusChanged]
            }
            None => Vec::new(),
        },
        Msg::ResponseReceived { body } => {
            let mut effects = Vec::with_capacity(body.len() + 1);
            let mut status_changed = false;
            for (key, value) in body {
                state.store_mut().set(key.clone(), value.clone());
                if DomainKey::from_response_key(&key).is_some() {
                    status_changed |= state.tracker_mut().end_api(&key);
                }
                effects.push(Effect::Publish(DomainUpdate { key, value }));
            }
            if status_changed {
                effects.push(Effect::StatusChanged);
            }
            effects
        }
        Msg::FileTransferStarted { file, total } => {
            state.tracker_mut().begin_file(file, total);
            vec![Effect::StatusChanged]
        }
        Msg::ChunkAcknowledged { file } => {
            if state.tracker_mut().advance_file(&file) {
                vec![Effect::StatusChanged]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}
