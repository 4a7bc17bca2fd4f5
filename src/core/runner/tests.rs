//! Batch runner tests

use super::*;
use crate::core::classify;
use crate::core::status::{BatchStatus, ItemStatus};
use crate::services::notifier::{BatchNotice, Notifier};
use crate::services::verifier::{VerifyError, VerifyResult, VerifierClient};
use crate::storage::MemoryStore;
use crate::utils::error::RunnerError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Verifier whose answers are scripted per subject; unscripted subjects get
/// a plain "registered".
struct ScriptedVerifier {
    responses: HashMap<String, VerifyResult>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedVerifier {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn respond(mut self, subject: &str, response: VerifyResult) -> Self {
        self.responses.insert(subject.to_string(), response);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerifierClient for ScriptedVerifier {
    async fn verify(&self, subject: &str) -> VerifyResult {
        self.calls.lock().unwrap().push(subject.to_string());
        self.responses
            .get(subject)
            .cloned()
            .unwrap_or_else(|| Ok("registered".to_string()))
    }
}

struct RecordingNotifier {
    notices: Mutex<Vec<BatchNotice>>,
    fail: bool,
}

impl RecordingNotifier {
    fn new(fail: bool) -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            fail,
        }
    }

    fn notices(&self) -> Vec<BatchNotice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn batch_completed(&self, notice: &BatchNotice) -> crate::Result<()> {
        self.notices.lock().unwrap().push(notice.clone());
        if self.fail {
            Err(RunnerError::Notification("smtp down".to_string()))
        } else {
            Ok(())
        }
    }
}

fn batch(id: &str) -> Batch {
    Batch {
        id: id.to_string(),
        company_id: "acme".to_string(),
        customer_name: "Owner".to_string(),
        customer_email: "owner@example.com".to_string(),
        item_count: 0,
        status: BatchStatus::Received,
        created_at: Utc::now(),
        completed_at: None,
        error: None,
    }
}

fn pending_item(id: &str, imei1: &str, imei2: Option<&str>) -> Item {
    Item {
        id: id.to_string(),
        imei1: imei1.to_string(),
        imei2: imei2.map(str::to_string),
        order_number: None,
        status: ItemStatus::PendingVerification,
        result1: None,
        result2: None,
        verified_at: None,
    }
}

fn runner(store: Arc<MemoryStore>, verifier: Arc<dyn VerifierClient>) -> BatchRunner {
    BatchRunner::new(store, verifier).with_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_missing_batch_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let verifier = Arc::new(ScriptedVerifier::new());
    let err = runner(store, verifier).run("nope").await.unwrap_err();
    assert!(matches!(err, RunnerError::NotFound(_)));
}

#[tokio::test]
async fn test_blank_subject_skips_network_call() {
    let store = Arc::new(MemoryStore::new());
    store.insert_batch(batch("B1")).await;
    store
        .insert_items("B1", vec![pending_item("A", "   ", Some(""))])
        .await;

    let verifier = Arc::new(ScriptedVerifier::new());
    runner(store.clone(), verifier.clone())
        .run("B1")
        .await
        .unwrap();

    assert!(verifier.calls().is_empty());
    let item = store.items("B1").await.remove(0);
    assert_eq!(item.status, ItemStatus::Verified);
    assert_eq!(item.result1.as_deref(), Some(classify::EMPTY));
    assert_eq!(item.result2.as_deref(), Some(classify::EMPTY));
    assert!(item.verified_at.is_some());
}

#[tokio::test]
async fn test_subjects_verified_in_order() {
    let store = Arc::new(MemoryStore::new());
    store.insert_batch(batch("B1")).await;
    store
        .insert_items(
            "B1",
            vec![pending_item("C", "222222222222222", Some("333333333333333"))],
        )
        .await;

    let verifier = Arc::new(ScriptedVerifier::new());
    runner(store, verifier.clone()).run("B1").await.unwrap();

    assert_eq!(
        verifier.calls(),
        vec!["222222222222222".to_string(), "333333333333333".to_string()]
    );
}

#[tokio::test]
async fn test_transport_error_becomes_sentinel_and_run_continues() {
    let store = Arc::new(MemoryStore::new());
    store.insert_batch(batch("B1")).await;
    store
        .insert_items(
            "B1",
            vec![
                pending_item("A", "111111111111111", None),
                pending_item("C", "222222222222222", None),
            ],
        )
        .await;

    let verifier = Arc::new(ScriptedVerifier::new().respond(
        "111111111111111",
        Err(VerifyError::Transport("connection refused".to_string())),
    ));
    runner(store.clone(), verifier).run("B1").await.unwrap();

    let items = store.items("B1").await;
    let a = items.iter().find(|i| i.id == "A").unwrap();
    let c = items.iter().find(|i| i.id == "C").unwrap();
    assert_eq!(a.result1.as_deref(), Some(classify::CONNECTION_ERROR));
    assert_eq!(a.status, ItemStatus::Verified);
    assert_eq!(c.result1.as_deref(), Some(classify::REGISTERED));
    assert_eq!(store.batch("B1").await.unwrap().status, BatchStatus::Completed);
}

#[tokio::test]
async fn test_unexpected_response_becomes_sentinel() {
    let store = Arc::new(MemoryStore::new());
    store.insert_batch(batch("B1")).await;
    store
        .insert_items("B1", vec![pending_item("A", "111111111111111", None)])
        .await;

    let verifier = Arc::new(ScriptedVerifier::new().respond(
        "111111111111111",
        Err(VerifyError::Unexpected("missing `resultado` field".to_string())),
    ));
    runner(store.clone(), verifier).run("B1").await.unwrap();

    let item = store.items("B1").await.remove(0);
    assert_eq!(item.result1.as_deref(), Some(classify::UNEXPECTED_RESPONSE));
    assert_eq!(item.status, ItemStatus::Verified);
}

#[tokio::test]
async fn test_unrecognized_response_passes_through() {
    let store = Arc::new(MemoryStore::new());
    store.insert_batch(batch("B1")).await;
    store
        .insert_items("B1", vec![pending_item("A", "111111111111111", None)])
        .await;

    let verifier = Arc::new(
        ScriptedVerifier::new().respond("111111111111111", Ok("homologación pendiente".to_string())),
    );
    runner(store.clone(), verifier).run("B1").await.unwrap();

    let item = store.items("B1").await.remove(0);
    assert_eq!(item.result1.as_deref(), Some("homologación pendiente"));
}

#[tokio::test]
async fn test_subject_is_trimmed_before_verification() {
    let store = Arc::new(MemoryStore::new());
    store.insert_batch(batch("B1")).await;
    store
        .insert_items("B1", vec![pending_item("A", "  111111111111111  ", None)])
        .await;

    let verifier = Arc::new(ScriptedVerifier::new());
    runner(store, verifier.clone()).run("B1").await.unwrap();

    assert_eq!(verifier.calls(), vec!["111111111111111".to_string()]);
}

#[tokio::test]
async fn test_notifier_failure_is_swallowed() {
    let store = Arc::new(MemoryStore::new());
    store.insert_batch(batch("B1")).await;
    store
        .insert_items("B1", vec![pending_item("A", "111111111111111", None)])
        .await;

    let notifier = Arc::new(RecordingNotifier::new(true));
    let verifier = Arc::new(ScriptedVerifier::new());
    let outcome = runner(store.clone(), verifier)
        .with_notifier(notifier.clone())
        .run("B1")
        .await
        .unwrap();

    assert_eq!(outcome.verified, 1);
    assert_eq!(notifier.notices().len(), 1);
    assert_eq!(store.batch("B1").await.unwrap().status, BatchStatus::Completed);
}

#[tokio::test]
async fn test_notice_carries_batch_details() {
    let store = Arc::new(MemoryStore::new());
    store.insert_batch(batch("B1")).await;
    store
        .insert_items("B1", vec![pending_item("A", "111111111111111", None)])
        .await;

    let notifier = Arc::new(RecordingNotifier::new(false));
    let verifier = Arc::new(ScriptedVerifier::new());
    runner(store, verifier)
        .with_notifier(notifier.clone())
        .run("B1")
        .await
        .unwrap();

    let notice = notifier.notices().remove(0);
    assert_eq!(notice.batch_id, "B1");
    assert_eq!(notice.company_id, "acme");
    assert_eq!(notice.recipient, "owner@example.com");
    assert_eq!(notice.item_count, 1);
}

#[tokio::test]
async fn test_rerun_on_completed_batch_is_noop() {
    let store = Arc::new(MemoryStore::new());
    let mut completed = batch("B1");
    completed.status = BatchStatus::Completed;
    store.insert_batch(completed).await;

    let notifier = Arc::new(RecordingNotifier::new(false));
    let verifier = Arc::new(ScriptedVerifier::new());
    let outcome = runner(store.clone(), verifier.clone())
        .with_notifier(notifier.clone())
        .run("B1")
        .await
        .unwrap();

    assert_eq!(outcome.verified, 0);
    assert!(verifier.calls().is_empty());
    assert!(notifier.notices().is_empty());
    assert_eq!(store.batch("B1").await.unwrap().status, BatchStatus::Completed);
}

#[tokio::test]
async fn test_failed_batch_is_retried() {
    let store = Arc::new(MemoryStore::new());
    let mut failed = batch("B1");
    failed.status = BatchStatus::Failed;
    failed.error = Some("earlier crash".to_string());
    store.insert_batch(failed).await;
    store
        .insert_items("B1", vec![pending_item("A", "111111111111111", None)])
        .await;

    let verifier = Arc::new(ScriptedVerifier::new());
    runner(store.clone(), verifier).run("B1").await.unwrap();

    let batch = store.batch("B1").await.unwrap();
    assert_eq!(batch.status, BatchStatus::Completed);
    assert!(batch.error.is_none());
}
