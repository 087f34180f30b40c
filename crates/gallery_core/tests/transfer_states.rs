use gallery_core::{AttemptResult, ChunkAttempts, TransferState};

#[test]
fn two_failures_then_success() {
    let mut attempts = ChunkAttempts::default();
    assert_eq!(attempts.state(), TransferState::Pending);
    assert_eq!(attempts.record(AttemptResult::Failed), TransferState::Retrying(2));
    assert_eq!(attempts.record(AttemptResult::Failed), TransferState::Retrying(1));
    assert_eq!(
        attempts.record(AttemptResult::Acknowledged),
        TransferState::Succeeded
    );
    assert_eq!(attempts.attempts(), 3);
}

#[test]
fn four_failures_exhaust_three_retries() {
    let mut attempts = ChunkAttempts::new(3);
    let states: Vec<_> = (0..4)
        .map(|_| attempts.record(AttemptResult::Failed))
        .collect();
    assert_eq!(
        states,
        vec![
            TransferState::Retrying(2),
            TransferState::Retrying(1),
            TransferState::Retrying(0),
            TransferState::Exhausted,
        ]
    );
    assert_eq!(attempts.attempts(), 4);

    // Terminal states absorb further results.
    assert_eq!(
        attempts.record(AttemptResult::Acknowledged),
        TransferState::Exhausted
    );
    assert_eq!(attempts.attempts(), 4);
}

#[test]
fn unacknowledged_response_is_terminal_without_retry() {
    let mut attempts = ChunkAttempts::new(3);
    assert_eq!(
        attempts.record(AttemptResult::Unacknowledged),
        TransferState::Unacknowledged
    );
    assert!(attempts.state().is_terminal());
    assert_eq!(attempts.retries_remaining(), 3);
}
