// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;

#[tokio::test]
async fn records_every_kind_of_call() {
    let notifier = FakeNotifier::new();
    notifier.queue_started(4).await.unwrap();
    notifier.stage_error("ripper (item #1)", "drive ejected").await.unwrap();
    notifier.queue_completed(3, 1, Duration::from_millis(250)).await.unwrap();

    let calls = notifier.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], NotifierCall::QueueStarted { count: 4 });
    assert_eq!(
        calls[1],
        NotifierCall::StageError {
            context: "ripper (item #1)".to_string(),
            message: "drive ejected".to_string(),
        }
    );
    assert_eq!(
        calls[2],
        NotifierCall::QueueCompleted { processed: 3, failed: 1, duration: Duration::from_millis(250) }
    );
}

#[tokio::test]
async fn counts_helpers_filter_by_kind() {
    let notifier = FakeNotifier::new();
    notifier.queue_started(1).await.unwrap();
    notifier.queue_started(1).await.unwrap();
    notifier.queue_completed(1, 0, Duration::from_secs(1)).await.unwrap();

    assert_eq!(notifier.queue_started_count(), 2);
    assert_eq!(notifier.queue_completed_count(), 1);
}
