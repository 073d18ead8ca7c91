// ABOUTME: Tests for the action submitter - like toggles with ledger
// ABOUTME: reconciliation and rollback, post creation, and sharing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::*;
use crate::error::{ClipboardError, FetchError, LedgerError, TransactionError};
use crate::feed::{FeedCoordinator, FeedStore, PageOutcome};
use crate::ledger::{Identity, Ledger, MemoryLedger, RawPost, Receipt};
use crate::session::Session;
use crate::test_support::{GATEWAY, seeded_ledger, session_for, test_config, viewer};

async fn loaded_feed(
    ledger: &Arc<MemoryLedger>,
) -> (FeedCoordinator, ActionSubmitter) {
    let store = Arc::new(RwLock::new(FeedStore::new()));
    let session = session_for(ledger);
    let coordinator = FeedCoordinator::with_store(session.clone(), test_config(), store.clone());
    assert!(matches!(
        coordinator.load_page(1).await.unwrap(),
        PageOutcome::Loaded(_)
    ));
    let submitter = ActionSubmitter::new(session, store, &test_config());
    (coordinator, submitter)
}

#[tokio::test]
async fn test_like_uses_ledger_count() {
    let ledger = seeded_ledger(10).await;
    let (coordinator, submitter) = loaded_feed(&ledger).await;

    // Someone else liked post 7 after the page was loaded.
    let other = crate::test_support::author();
    ledger.seed_like(7, &other).await;

    let outcome = submitter.submit_like(7).await.unwrap();
    assert!(outcome.liked);
    assert_eq!(outcome.like_count, 2);

    let store = coordinator.store();
    let post = store.read().await.get(7).cloned().unwrap();
    assert!(post.liked_by_viewer);
    assert_eq!(post.like_count, 2);
    assert!(ledger.has_liked(7, &viewer()).await.unwrap());
}

#[tokio::test]
async fn test_second_toggle_unlikes() {
    let ledger = seeded_ledger(10).await;
    let (_coordinator, submitter) = loaded_feed(&ledger).await;

    submitter.submit_like(3).await.unwrap();
    let outcome = submitter.submit_like(3).await.unwrap();
    assert!(!outcome.liked);
    assert_eq!(outcome.like_count, 0);
    assert!(!ledger.has_liked(3, &viewer()).await.unwrap());
}

#[tokio::test]
async fn test_rejected_like_rolls_back() {
    let ledger = seeded_ledger(10).await;
    let (coordinator, submitter) = loaded_feed(&ledger).await;
    ledger.reject_writes(true).await;

    let err = submitter.submit_like(5).await.unwrap_err();
    assert!(matches!(err, TransactionError::Rejected(_)));

    let store = coordinator.store();
    let post = store.read().await.get(5).cloned().unwrap();
    assert!(!post.liked_by_viewer);
    assert_eq!(post.like_count, 0);
}

#[tokio::test]
async fn test_failed_reconcile_keeps_new_flag() {
    let ledger = seeded_ledger(10).await;
    let (coordinator, submitter) = loaded_feed(&ledger).await;
    ledger.fail_reads_after_write(true).await;

    let err = submitter.submit_like(6).await.unwrap_err();
    match err {
        TransactionError::Reconcile { index, source } => {
            assert_eq!(index, 6);
            assert!(matches!(source, FetchError::Ledger(_)));
        }
        other => panic!("Expected Reconcile, got {:?}", other),
    }

    // The like is committed, so the store keeps the flipped flag.
    assert!(ledger.has_liked(6, &viewer()).await.unwrap());
    let store = coordinator.store();
    assert!(store.read().await.get(6).unwrap().liked_by_viewer);
}

#[tokio::test]
async fn test_slow_write_times_out_and_rolls_back() {
    let ledger = seeded_ledger(10).await;
    let store = Arc::new(RwLock::new(FeedStore::new()));
    let session = session_for(&ledger);
    let coordinator = FeedCoordinator::with_store(session.clone(), test_config(), store.clone());
    coordinator.load_page(1).await.unwrap();

    let config = test_config().request_timeout(Duration::from_millis(20));
    let submitter = ActionSubmitter::new(session, store.clone(), &config);
    ledger.set_write_delay(Some(Duration::from_millis(200))).await;

    let err = submitter.submit_like(4).await.unwrap_err();
    assert!(matches!(err, TransactionError::Timeout(_)));
    assert!(!store.read().await.get(4).unwrap().liked_by_viewer);

    let err = submitter.submit_create("too slow").await.unwrap_err();
    assert!(matches!(err, TransactionError::Timeout(_)));
}

#[tokio::test]
async fn test_toggles_on_same_post_run_in_order() {
    let ledger = seeded_ledger(10).await;
    let (coordinator, submitter) = loaded_feed(&ledger).await;
    ledger.set_write_delay(Some(Duration::from_millis(50))).await;

    let (first, second) = tokio::join!(submitter.submit_like(3), submitter.submit_like(3));
    let first = first.unwrap();
    let second = second.unwrap();
    assert!(first.liked);
    assert_eq!(first.like_count, 1);
    assert!(!second.liked);
    assert_eq!(second.like_count, 0);

    assert!(!ledger.has_liked(3, &viewer()).await.unwrap());
    let store = coordinator.store();
    assert!(!store.read().await.get(3).unwrap().liked_by_viewer);
}

#[tokio::test]
async fn test_like_on_uncached_post_reads_ledger_state() {
    let ledger = seeded_ledger(3).await;
    ledger.seed_like(1, &viewer()).await;
    let submitter = ActionSubmitter::new(
        session_for(&ledger),
        Arc::new(RwLock::new(FeedStore::new())),
        &test_config(),
    );

    let outcome = submitter.submit_like(1).await.unwrap();
    assert!(!outcome.liked);
    assert_eq!(outcome.like_count, 0);
}

#[tokio::test]
async fn test_create_inserts_at_head() {
    let ledger = seeded_ledger(4).await;
    let (coordinator, submitter) = loaded_feed(&ledger).await;

    let post = submitter.submit_create("hello ledger").await.unwrap();
    assert_eq!(post.index, 4);
    assert_eq!(post.author, viewer());
    assert_eq!(post.like_count, 0);
    assert!(!post.liked_by_viewer);
    assert_eq!(post.avatar_url, Some(format!("{}/ipfs/QmViewer", GATEWAY)));
    assert!(post.created_at > 0);

    let posts = coordinator.posts().await;
    assert_eq!(posts[0].index, 4);
    assert_eq!(posts.len(), 5);
    assert_eq!(ledger.total_count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_create_rejects_blank_content() {
    let ledger = seeded_ledger(0).await;
    let submitter = ActionSubmitter::new(
        session_for(&ledger),
        Arc::new(RwLock::new(FeedStore::new())),
        &test_config(),
    );

    let err = submitter.submit_create("   \n").await.unwrap_err();
    assert!(matches!(err, TransactionError::EmptyContent));
    assert_eq!(ledger.total_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejected_by_wallet() {
    let ledger = seeded_ledger(0).await;
    ledger.reject_writes(true).await;
    let store = Arc::new(RwLock::new(FeedStore::new()));
    let submitter = ActionSubmitter::new(session_for(&ledger), store.clone(), &test_config());

    let err = submitter.submit_create("gm").await.unwrap_err();
    assert!(matches!(err, TransactionError::Rejected(_)));
    assert!(store.read().await.is_empty());
}

/// Ledger whose create receipts omit the new post's index.
struct NoIndexLedger(Arc<MemoryLedger>);

#[async_trait]
impl Ledger for NoIndexLedger {
    async fn total_count(&self) -> Result<u64, LedgerError> {
        self.0.total_count().await
    }

    async fn get_record(&self, index: u64) -> Result<RawPost, LedgerError> {
        self.0.get_record(index).await
    }

    async fn has_liked(&self, index: u64, identity: &Identity) -> Result<bool, LedgerError> {
        self.0.has_liked(index, identity).await
    }

    async fn like(&self, index: u64, from: &Identity) -> Result<Receipt, LedgerError> {
        self.0.like(index, from).await
    }

    async fn unlike(&self, index: u64, from: &Identity) -> Result<Receipt, LedgerError> {
        self.0.unlike(index, from).await
    }

    async fn create_post(&self, content: &str, from: &Identity) -> Result<Receipt, LedgerError> {
        let receipt = self.0.create_post(content, from).await?;
        Ok(Receipt {
            post_index: None,
            ..receipt
        })
    }
}

#[tokio::test]
async fn test_create_without_index_in_receipt() {
    let ledger = seeded_ledger(2).await;
    let session = Session::with_gateway(
        viewer(),
        Arc::new(NoIndexLedger(ledger.clone())),
        ledger.clone(),
        GATEWAY,
    );
    let store = Arc::new(RwLock::new(FeedStore::new()));
    let submitter = ActionSubmitter::new(session, store.clone(), &test_config());

    let err = submitter.submit_create("where did it go").await.unwrap_err();
    assert!(matches!(err, TransactionError::MissingPostIndex));
    assert!(store.read().await.is_empty());
}

#[tokio::test]
async fn test_create_by_viewer_without_avatar() {
    let ledger = Arc::new(MemoryLedger::new());
    let store = Arc::new(RwLock::new(FeedStore::new()));
    let submitter = ActionSubmitter::new(session_for(&ledger), store.clone(), &test_config());

    let post = submitter.submit_create("gm").await.unwrap();
    assert_eq!(post.index, 0);
    assert_eq!(post.avatar_url, None);
    assert_eq!(store.read().await.len(), 1);
    assert_eq!(ledger.total_count().await.unwrap(), 1);
}

struct BrokenClipboard;

#[async_trait]
impl Clipboard for BrokenClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable("no display".to_string()))
    }
}

#[tokio::test]
async fn test_share_copies_link() {
    let ledger = seeded_ledger(1).await;
    let (_coordinator, submitter) = loaded_feed(&ledger).await;
    let clipboard = MemoryClipboard::new();

    let link = submitter.share(0, &clipboard).await.unwrap();
    assert_eq!(link, "https://feed.test/sharepost/display_shared_post.html?postid=0");
    assert_eq!(clipboard.contents().await, Some(link));

    assert!(submitter.share(0, &BrokenClipboard).await.is_err());
}
