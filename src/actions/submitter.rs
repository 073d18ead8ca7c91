// ABOUTME: Action submitter - like/unlike toggles and new posts sent to the
// ABOUTME: ledger, reconciling the shared store from the ledger's own state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::{Clipboard, share_link};
use crate::config::FeedConfig;
use crate::error::{ClipboardError, FetchError, LedgerError, TransactionError};
use crate::feed::{FeedStore, Post};
use crate::ledger::Receipt;
use crate::session::Session;

/// Ledger-confirmed like state of a post after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub index: u64,
    pub liked: bool,
    pub like_count: u64,
}

/// Sends likes, unlikes and new posts on behalf of the session's identity.
pub struct ActionSubmitter {
    session: Session,
    store: Arc<RwLock<FeedStore>>,
    timeout: Duration,
    share_origin: String,
    like_locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl ActionSubmitter {
    pub fn new(session: Session, store: Arc<RwLock<FeedStore>>, config: &FeedConfig) -> Self {
        Self {
            session,
            store,
            timeout: config.request_timeout,
            share_origin: config.share_origin.clone(),
            like_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Toggle the viewer's like on the post at `index`.
    ///
    /// The liked flag flips in the store right away; the count is only ever
    /// taken from the ledger after the write. If the write fails the flag goes
    /// back to its pre-click value.
    ///
    /// Toggles of the same post run one after another: a second toggle waits
    /// for the first to settle and then acts on the flag it left behind.
    pub async fn submit_like(&self, index: u64) -> Result<LikeOutcome, TransactionError> {
        let lock = self.like_lock(index).await;
        let _turn = lock.lock().await;

        let was_liked = self.current_like(index).await?;
        let cached = self.store.write().await.set_like(index, !was_liked, None);

        let viewer = self.session.identity();
        let ledger = self.session.ledger();
        let write = async {
            if was_liked {
                ledger.unlike(index, viewer).await
            } else {
                ledger.like(index, viewer).await
            }
        };

        if let Err(e) = self.bounded_write(write).await {
            if cached {
                self.store.write().await.set_like(index, was_liked, None);
            }
            tracing::warn!(index, error = %e, "like toggle failed, restored");
            return Err(e);
        }

        let like_count = match tokio::time::timeout(self.timeout, ledger.get_record(index)).await {
            Ok(Ok(record)) => record.like_count,
            Ok(Err(e)) => return Err(reconcile(index, e.into())),
            Err(_) => return Err(reconcile(index, FetchError::Timeout(self.timeout))),
        };

        self.store
            .write()
            .await
            .set_like(index, !was_liked, Some(like_count));
        tracing::info!(index, liked = !was_liked, like_count, "like toggled");

        Ok(LikeOutcome {
            index,
            liked: !was_liked,
            like_count,
        })
    }

    /// Publish a new post and add it to the head of the store.
    ///
    /// The timestamp is the one the ledger reports in the receipt, falling back
    /// to the local clock when the ledger does not report one.
    pub async fn submit_create(&self, content: &str) -> Result<Post, TransactionError> {
        if content.trim().is_empty() {
            return Err(TransactionError::EmptyContent);
        }

        let author = self.session.identity();
        let receipt = self
            .bounded_write(self.session.ledger().create_post(content, author))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "create post failed"))?;
        let index = receipt.post_index.ok_or(TransactionError::MissingPostIndex)?;

        let avatar_url = match tokio::time::timeout(
            self.timeout,
            self.session.avatars().resolve_avatar(author),
        )
        .await
        {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => return Err(reconcile(index, e)),
            Err(_) => return Err(reconcile(index, FetchError::Timeout(self.timeout))),
        };

        let post = Post {
            index,
            author: author.clone(),
            content: content.to_string(),
            created_at: receipt.timestamp.unwrap_or_else(unix_now),
            like_count: 0,
            liked_by_viewer: false,
            avatar_url,
        };
        self.store.write().await.insert(post.clone());
        tracing::info!(index, tx = %receipt.tx_hash, "post created");

        Ok(post)
    }

    /// Copy the share link for the post at `index` to `clipboard`.
    pub async fn share(&self, index: u64, clipboard: &dyn Clipboard) -> Result<String, ClipboardError> {
        let link = share_link(&self.share_origin, index);
        clipboard.write_text(&link).await?;
        Ok(link)
    }

    async fn like_lock(&self, index: u64) -> Arc<Mutex<()>> {
        self.like_locks
            .lock()
            .await
            .entry(index)
            .or_default()
            .clone()
    }

    /// Viewer's like state: the store's copy if cached, otherwise the ledger's.
    async fn current_like(&self, index: u64) -> Result<bool, TransactionError> {
        if let Some(post) = self.store.read().await.get(index) {
            return Ok(post.liked_by_viewer);
        }
        let lookup = self.session.ledger().has_liked(index, self.session.identity());
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(result) => result.map_err(TransactionError::from),
            Err(_) => Err(TransactionError::Timeout(self.timeout)),
        }
    }

    async fn bounded_write<F>(&self, write: F) -> Result<Receipt, TransactionError>
    where
        F: std::future::Future<Output = Result<Receipt, LedgerError>>,
    {
        match tokio::time::timeout(self.timeout, write).await {
            Ok(result) => result.map_err(TransactionError::from),
            Err(_) => Err(TransactionError::Timeout(self.timeout)),
        }
    }
}

fn reconcile(index: u64, source: FetchError) -> TransactionError {
    tracing::warn!(index, error = %source, "write committed but reconcile failed");
    TransactionError::Reconcile { index, source }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
