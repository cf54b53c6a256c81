// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;
use spindle_core::Status;

fn item() -> Item {
    Item::for_new_disc("Demo", Some("FP".to_string()))
}

#[tokio::test]
async fn default_handler_succeeds_and_records_calls() {
    let handler = FakeStageHandler::new("identifier");
    let mut it = item();
    handler.prepare(&mut it).await.unwrap();
    handler.execute(&mut it, CancellationToken::new()).await.unwrap();
    assert_eq!(handler.calls(), vec!["prepare", "execute"]);
}

#[tokio::test]
async fn prepare_failure_is_returned_and_does_not_call_execute_by_itself() {
    let err = ClassifiedError::validation("check", "missing field");
    let handler = FakeStageHandler::new("identifier").with_prepare_failure(err.clone());
    let mut it = item();
    let got = handler.prepare(&mut it).await.unwrap_err();
    assert_eq!(got.message, "missing field");
}

#[tokio::test]
async fn execute_failure_is_returned() {
    let err = ClassifiedError::external_tool("rip", "drive ejected");
    let handler = FakeStageHandler::new("ripper").with_execute_failure(err);
    let mut it = item();
    let got = handler.execute(&mut it, CancellationToken::new()).await.unwrap_err();
    match got {
        StageError::Classified(e) => assert_eq!(e.message, "drive ejected"),
        StageError::Cancelled => panic!("expected Classified"),
    }
}

#[tokio::test]
async fn mutate_on_success_is_applied() {
    let handler = FakeStageHandler::new("ripper").with_mutate(|item| {
        item.ripped_file = Some("/out/movie.mkv".to_string());
        item.status = Status::Ripped;
    });
    let mut it = item();
    handler.execute(&mut it, CancellationToken::new()).await.unwrap();
    assert_eq!(it.ripped_file.as_deref(), Some("/out/movie.mkv"));
}

#[tokio::test]
async fn await_cancellation_returns_cancelled_once_token_fires() {
    let handler = FakeStageHandler::new("encoder").await_cancellation();
    let token = CancellationToken::new();
    let mut it = item();

    let token2 = token.clone();
    let execute = tokio::spawn(async move { handler.execute(&mut it, token2).await });
    tokio::task::yield_now().await;
    token.cancel();

    let result = execute.await.unwrap();
    assert!(matches!(result, Err(StageError::Cancelled)));
}

#[tokio::test]
async fn execute_delay_is_cut_short_by_cancellation() {
    let handler = FakeStageHandler::new("encoder").with_execute_delay(Duration::from_secs(3600));
    let token = CancellationToken::new();
    let mut it = item();

    let token2 = token.clone();
    let execute = tokio::spawn(async move { handler.execute(&mut it, token2).await });
    tokio::task::yield_now().await;
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(1), execute)
        .await
        .expect("should not hang")
        .unwrap();
    assert!(matches!(result, Err(StageError::Cancelled)));
}

#[tokio::test]
async fn health_check_reflects_configuration() {
    let handler = FakeStageHandler::new("organizer").with_health(HealthCheck::not_ready("organizer", "no disk space"));
    let hc = handler.health_check().await;
    assert!(!hc.ready);
    assert_eq!(hc.detail, "no disk space");
}
