use std::sync::Once;

use gallery_core::{update, DomainUpdate, Effect, Msg, OperationName, SyncState};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(gallery_logging::initialize_for_tests);
}

fn body(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object body")
}

fn publishes(effects: &[Effect]) -> Vec<&DomainUpdate> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Publish(update) => Some(update),
            Effect::StatusChanged => None,
        })
        .collect()
}

#[test]
fn dispatch_registers_first_matching_domain() {
    init_logging();
    let (state, effects) = update(
        SyncState::new(),
        Msg::DispatchStarted(OperationName::ImageEdit),
    );

    assert_eq!(effects, vec![Effect::StatusChanged]);
    let pending = state.tracker().pending_api();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].handler, "image_data");
    assert_eq!(pending[0].text, "API image data");
    assert!(state.status().busy);
}

#[test]
fn response_publishes_one_event_per_top_level_key() {
    init_logging();
    let (state, _) = update(
        SyncState::new(),
        Msg::DispatchStarted(OperationName::SettingsSetUser),
    );
    let (state, effects) = update(
        state,
        Msg::ResponseReceived {
            body: body(json!({
                "user_data": [{"name": "admin"}],
                "permission_settings": {"admin": true},
                "extra": 7
            })),
        },
    );

    let published = publishes(&effects);
    assert_eq!(published.len(), 3);
    let mut keys: Vec<_> = published.iter().map(|u| u.key.as_str()).collect();
    keys.sort();
    assert_eq!(keys, vec!["extra", "permission_settings", "user_data"]);

    assert_eq!(state.get("user_data"), Some(&json!([{"name": "admin"}])));
    assert_eq!(state.get("permission_settings"), Some(&json!({"admin": true})));
    assert_eq!(state.get("extra"), Some(&json!(7)));
    assert!(effects.contains(&Effect::StatusChanged));
    assert!(!state.status().busy);
}

#[test]
fn response_overwrites_and_never_coalesces() {
    init_logging();
    let mut state = SyncState::new();
    let mut total_publishes = 0;
    for _ in 0..3 {
        let (next, effects) = update(
            state,
            Msg::ResponseReceived {
                body: body(json!({"log_data": ["same"]})),
            },
        );
        total_publishes += publishes(&effects).len();
        state = next;
    }
    assert_eq!(total_publishes, 3);

    let (state, _) = update(
        state,
        Msg::ResponseReceived {
            body: body(json!({"log_data": {"replaced": true}})),
        },
    );
    assert_eq!(state.get("log_data"), Some(&json!({"replaced": true})));
}

#[test]
fn response_resolves_only_one_of_several_pending_for_same_handler() {
    init_logging();
    let (state, _) = update(
        SyncState::new(),
        Msg::DispatchStarted(OperationName::ImageData),
    );
    let (state, _) = update(state, Msg::DispatchStarted(OperationName::ImageDelete));
    assert_eq!(state.tracker().pending_api().len(), 2);

    let (state, _) = update(
        state,
        Msg::ResponseReceived {
            body: body(json!({"image_data": []})),
        },
    );
    assert_eq!(state.tracker().pending_api().len(), 1);
    assert_eq!(state.status().lines, vec!["Waiting for API image data."]);
}

#[test]
fn response_for_unrelated_domain_leaves_pending_entry() {
    init_logging();
    let (state, _) = update(
        SyncState::new(),
        Msg::DispatchStarted(OperationName::MaintenanceGetInfo),
    );
    let (state, effects) = update(
        state,
        Msg::ResponseReceived {
            body: body(json!({"task_data": {}})),
        },
    );

    assert!(!effects.contains(&Effect::StatusChanged));
    assert_eq!(state.tracker().pending_api()[0].handler, "server_data");
}

#[test]
fn chunk_acknowledgments_drain_file_entry() {
    init_logging();
    let (state, _) = update(
        SyncState::new(),
        Msg::FileTransferStarted {
            file: "cat.jpg".to_string(),
            total: 2,
        },
    );
    let ack = || Msg::ChunkAcknowledged {
        file: "cat.jpg".to_string(),
    };
    let (state, effects) = update(state, ack());
    assert_eq!(effects, vec![Effect::StatusChanged]);
    assert_eq!(state.tracker().pending_files()[0].received, 1);

    let (state, _) = update(state, ack());
    assert!(state.tracker().pending_files().is_empty());

    let (_state, effects) = update(state, ack());
    assert!(effects.is_empty());
}

#[test]
fn events_follow_response_key_order() {
    init_logging();
    let body: Map<String, Value> = serde_json::from_str(
        r#"{"user_data": [], "image_data": [], "category_data": {}}"#,
    )
    .expect("object body");
    let (_, effects) = update(SyncState::new(), Msg::ResponseReceived { body });

    let keys: Vec<&str> = publishes(&effects)
        .iter()
        .map(|update| update.key.as_str())
        .collect();
    assert_eq!(keys, vec!["user_data", "image_data", "category_data"]);
}

#[test]
fn acknowledgment_for_unknown_file_changes_nothing() {
    init_logging();
    let (state, _) = update(
        SyncState::new(),
        Msg::FileTransferStarted {
            file: "known.jpg".to_string(),
            total: 2,
        },
    );
    let (next, effects) = update(
        state.clone(),
        Msg::ChunkAcknowledged {
            file: "other.jpg".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(next, state);
}
