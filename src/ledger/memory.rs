// ABOUTME: In-memory ledger and profile registry for offline runs and tests.
// ABOUTME: Supports read/write fault injection, artificial latency and call counts.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Identity, Ledger, ProfileRegistry, RawPost, Receipt};
use crate::error::LedgerError;

struct StoredPost {
    author: Identity,
    content: String,
    created_at: u64,
    likers: HashSet<Identity>,
}

#[derive(Default)]
struct MemoryState {
    posts: Vec<StoredPost>,
    avatar_cids: HashMap<Identity, String>,
    usernames: HashMap<Identity, String>,
    failing_reads: HashSet<u64>,
    reject_writes: bool,
    fail_reads_after_write: bool,
    read_delay: Option<Duration>,
    write_delay: Option<Duration>,
}

impl MemoryState {
    /// Called after a write to `index` lands.
    fn written(&mut self, index: u64) {
        if self.fail_reads_after_write {
            self.failing_reads.insert(index);
        }
    }
}

/// Ledger held entirely in memory.
///
/// Behaves like the post contract: indices are assigned in append order,
/// a like is recorded at most once per identity, and `unlike` of a post the
/// identity does not like is refused.
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<MemoryState>,
    record_reads: AtomicUsize,
    count_reads: AtomicUsize,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a post directly, bypassing the write path. Returns its index.
    pub async fn seed_post(
        &self,
        author: &Identity,
        content: impl Into<String>,
        created_at: u64,
    ) -> u64 {
        let mut state = self.state.lock().await;
        state.posts.push(StoredPost {
            author: author.clone(),
            content: content.into(),
            created_at,
            likers: HashSet::new(),
        });
        (state.posts.len() - 1) as u64
    }

    /// Record `liker` as liking the post at `index`, bypassing the write path.
    pub async fn seed_like(&self, index: u64, liker: &Identity) {
        let mut state = self.state.lock().await;
        if let Some(post) = state.posts.get_mut(index as usize) {
            post.likers.insert(liker.clone());
        }
    }

    /// Register a profile for `identity`.
    pub async fn set_profile(
        &self,
        identity: &Identity,
        username: impl Into<String>,
        avatar_cid: impl Into<String>,
    ) {
        let mut state = self.state.lock().await;
        state.usernames.insert(identity.clone(), username.into());
        state.avatar_cids.insert(identity.clone(), avatar_cid.into());
    }

    /// Make every `get_record(index)` fail until cleared.
    pub async fn fail_reads_at(&self, index: u64) {
        self.state.lock().await.failing_reads.insert(index);
    }

    /// Clear all read faults.
    pub async fn clear_read_faults(&self) {
        self.state.lock().await.failing_reads.clear();
    }

    /// Refuse every write as if the user declined it in the wallet.
    pub async fn reject_writes(&self, reject: bool) {
        self.state.lock().await.reject_writes = reject;
    }

    /// After each successful write, make reads of the written post fail.
    pub async fn fail_reads_after_write(&self, fail: bool) {
        self.state.lock().await.fail_reads_after_write = fail;
    }

    /// Delay every write by `delay`.
    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.write_delay = delay;
    }

    /// Delay every record read by `delay`.
    pub async fn set_read_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.read_delay = delay;
    }

    /// Number of `get_record` calls served so far.
    pub fn record_reads(&self) -> usize {
        self.record_reads.load(Ordering::SeqCst)
    }

    /// Number of `total_count` calls served so far.
    pub fn count_reads(&self) -> usize {
        self.count_reads.load(Ordering::SeqCst)
    }

    async fn check_write(&self) -> Result<(), LedgerError> {
        let delay = self.state.lock().await.write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.state.lock().await.reject_writes {
            return Err(LedgerError::Rpc {
                code: LedgerError::USER_REJECTED,
                message: "User denied transaction signature".to_string(),
            });
        }
        Ok(())
    }

    fn receipt(post_index: Option<u64>) -> Receipt {
        Receipt {
            tx_hash: format!("0x{}", Uuid::new_v4().simple()),
            post_index,
            timestamp: Some(unix_now()),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn out_of_range(index: u64) -> LedgerError {
    LedgerError::Rpc {
        code: -32000,
        message: format!("execution reverted: post {} does not exist", index),
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn total_count(&self) -> Result<u64, LedgerError> {
        self.count_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().await.posts.len() as u64)
    }

    async fn get_record(&self, index: u64) -> Result<RawPost, LedgerError> {
        self.record_reads.fetch_add(1, Ordering::SeqCst);

        let delay = self.state.lock().await.read_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().await;
        if state.failing_reads.contains(&index) {
            return Err(LedgerError::Protocol(format!("injected read failure at {}", index)));
        }
        let post = state
            .posts
            .get(index as usize)
            .ok_or_else(|| out_of_range(index))?;

        Ok(RawPost {
            index,
            author: post.author.clone(),
            content: post.content.clone(),
            created_at: post.created_at,
            like_count: post.likers.len() as u64,
        })
    }

    async fn has_liked(&self, index: u64, identity: &Identity) -> Result<bool, LedgerError> {
        let state = self.state.lock().await;
        let post = state
            .posts
            .get(index as usize)
            .ok_or_else(|| out_of_range(index))?;
        Ok(post.likers.contains(identity))
    }

    async fn like(&self, index: u64, from: &Identity) -> Result<Receipt, LedgerError> {
        self.check_write().await?;
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .get_mut(index as usize)
            .ok_or_else(|| out_of_range(index))?;
        if !post.likers.insert(from.clone()) {
            return Err(LedgerError::Rpc {
                code: -32000,
                message: "execution reverted: already liked".to_string(),
            });
        }
        state.written(index);
        Ok(Self::receipt(None))
    }

    async fn unlike(&self, index: u64, from: &Identity) -> Result<Receipt, LedgerError> {
        self.check_write().await?;
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .get_mut(index as usize)
            .ok_or_else(|| out_of_range(index))?;
        if !post.likers.remove(from) {
            return Err(LedgerError::Rpc {
                code: -32000,
                message: "execution reverted: not liked".to_string(),
            });
        }
        state.written(index);
        Ok(Self::receipt(None))
    }

    async fn create_post(&self, content: &str, from: &Identity) -> Result<Receipt, LedgerError> {
        self.check_write().await?;
        let receipt = Self::receipt(None);
        let mut state = self.state.lock().await;
        state.posts.push(StoredPost {
            author: from.clone(),
            content: content.to_string(),
            created_at: receipt.timestamp.unwrap_or_default(),
            likers: HashSet::new(),
        });
        let index = (state.posts.len() - 1) as u64;
        state.written(index);
        Ok(Receipt {
            post_index: Some(index),
            ..receipt
        })
    }
}

#[async_trait]
impl ProfileRegistry for MemoryLedger {
    async fn avatar_cid(&self, identity: &Identity) -> Result<String, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.avatar_cids.get(identity).cloned().unwrap_or_default())
    }

    async fn username(&self, identity: &Identity) -> Result<String, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.usernames.get(identity).cloned().unwrap_or_default())
    }
}
