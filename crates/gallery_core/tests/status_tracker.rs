use gallery_core::StatusTracker;
use pretty_assertions::assert_eq;

#[test]
fn begin_then_end_clears_entry() {
    let mut tracker = StatusTracker::new();
    tracker.begin_api("user_data", "API user data");
    assert!(tracker.is_busy());
    assert!(tracker.end_api("user_data"));
    assert!(!tracker.is_busy());
    assert!(!tracker.end_api("user_data"));
}

#[test]
fn begin_without_end_leaves_exactly_one_entry() {
    let mut tracker = StatusTracker::new();
    tracker.begin_api("log_data", "API log data");
    tracker.begin_api("server_data", "API server data");
    tracker.end_api("server_data");

    assert_eq!(tracker.pending_api().len(), 1);
    assert_eq!(tracker.pending_api()[0].handler, "log_data");
    assert!(tracker.snapshot().busy);
}

#[test]
fn listing_dedupes_but_counting_does_not() {
    let mut tracker = StatusTracker::new();
    tracker.begin_api("image_data", "API image data");
    tracker.begin_api("image_data", "API image data");
    tracker.begin_file("a.png", 3);
    tracker.begin_file("a.png", 1);
    tracker.begin_file("b.png", 1);

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.api_pending, 2);
    assert_eq!(snapshot.files_pending, 3);
    assert_eq!(
        snapshot.lines,
        vec![
            "Waiting for API image data.",
            "Waiting for a.png.",
            "Waiting for b.png.",
        ]
    );
}

#[test]
fn advance_targets_first_entry_with_that_name() {
    let mut tracker = StatusTracker::new();
    tracker.begin_file("dup.png", 1);
    tracker.begin_file("dup.png", 2);

    assert!(tracker.advance_file("dup.png"));
    assert_eq!(tracker.pending_files().len(), 1);
    assert_eq!(tracker.pending_files()[0].total, 2);
    assert_eq!(tracker.pending_files()[0].received, 0);
}

#[test]
fn end_file_requires_all_chunks() {
    let mut tracker = StatusTracker::new();
    tracker.begin_file("big.tif", 2);
    assert!(!tracker.end_file("big.tif"));
    assert!(!tracker.advance_file("missing.tif"));

    tracker.begin_file("empty.tif", 0);
    assert!(tracker.end_file("empty.tif"));
    assert_eq!(tracker.pending_files().len(), 1);
}

#[test]
fn idle_tracker_renders_nothing() {
    let tracker = StatusTracker::new();
    let snapshot = tracker.snapshot();
    assert!(!snapshot.busy);
    assert!(snapshot.lines.is_empty());
}
