// ABOUTME: Feed coordinator - loads newest-first pages from the ledger with a
// ABOUTME: single-flight guard, cancellation, exhaustion tracking and page discard.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::{Mutex, RwLock, watch};

use super::projection::bounded;
use super::{Cursor, FeedStore, PageRange, Post, PostProjector};
use crate::config::FeedConfig;
use crate::error::FetchError;
use crate::session::Session;

/// One successfully loaded page.
#[derive(Debug, Clone)]
pub struct FeedPage {
    /// The page number that was requested.
    pub page: u64,
    /// Indices covered, `None` when nothing was left to fetch.
    pub range: Option<PageRange>,
    /// Posts in strictly descending index order.
    pub posts: Vec<Post>,
    /// No further pages exist; stop requesting more.
    pub exhausted: bool,
}

/// Why a load request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another page load is running; the request was dropped.
    InFlight,
    /// The feed already reached the oldest post.
    Exhausted,
    /// The page lies behind the cursor.
    AlreadyLoaded,
}

/// Result of a load request that did not fail.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Loaded(FeedPage),
    Skipped(SkipReason),
}

struct CoordinatorState {
    cursor: Cursor,
    exhausted: bool,
}

/// Drives paginated retrieval of posts from the ledger.
///
/// # Load Semantics
///
/// - **Single flight:** a call made while another load runs returns
///   `Skipped(InFlight)` without touching the ledger.
/// - **All or nothing:** if any record of a page fails, the partial page is
///   discarded, the cursor stays put and `FetchError::PageDiscarded` is returned.
///   Pages loaded earlier are unaffected.
/// - **Cancellation:** `navigate_away()` and `reload()` abort a running load
///   with `FetchError::Cancelled`.
pub struct FeedCoordinator {
    session: Session,
    projector: PostProjector,
    config: FeedConfig,
    state: Mutex<CoordinatorState>,
    store: Arc<RwLock<FeedStore>>,
    in_flight: Mutex<()>,
    generation: watch::Sender<u64>,
}

impl FeedCoordinator {
    /// Create a coordinator with its own empty store.
    pub fn new(session: Session, config: FeedConfig) -> Self {
        Self::with_store(session, config, Arc::new(RwLock::new(FeedStore::new())))
    }

    /// Create a coordinator writing into a shared store.
    pub fn with_store(session: Session, config: FeedConfig, store: Arc<RwLock<FeedStore>>) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            projector: PostProjector::new(session.clone(), config.request_timeout),
            state: Mutex::new(CoordinatorState {
                cursor: Cursor::new(config.page_size),
                exhausted: false,
            }),
            session,
            config,
            store,
            in_flight: Mutex::new(()),
            generation,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The store this coordinator fills.
    pub fn store(&self) -> Arc<RwLock<FeedStore>> {
        self.store.clone()
    }

    /// Snapshot of the pagination cursor.
    pub async fn cursor(&self) -> Cursor {
        self.state.lock().await.cursor.clone()
    }

    pub async fn is_exhausted(&self) -> bool {
        self.state.lock().await.exhausted
    }

    /// All posts loaded so far, newest first.
    pub async fn posts(&self) -> Vec<Post> {
        self.store.read().await.newest_first()
    }

    /// Load `page` (1-based).
    pub async fn load_page(&self, page: u64) -> Result<PageOutcome, FetchError> {
        self.load_page_with_cancel(page, std::future::pending::<()>())
            .await
    }

    /// Load the page after the last one loaded.
    pub async fn load_next(&self) -> Result<PageOutcome, FetchError> {
        let page = self.state.lock().await.cursor.page;
        self.load_page(page).await
    }

    /// Load `page`, giving up with `FetchError::Cancelled` if `cancel` completes first.
    pub async fn load_page_with_cancel<F>(&self, page: u64, cancel: F) -> Result<PageOutcome, FetchError>
    where
        F: Future<Output = ()>,
    {
        if page == 0 {
            return Err(FetchError::InvalidPage(page));
        }

        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!(page, "page load already in flight, dropping request");
            return Ok(PageOutcome::Skipped(SkipReason::InFlight));
        };

        let mut changes = self.generation.subscribe();
        let generation = *changes.borrow_and_update();

        {
            let state = self.state.lock().await;
            if state.exhausted {
                return Ok(PageOutcome::Skipped(SkipReason::Exhausted));
            }
            if page < state.cursor.page {
                return Ok(PageOutcome::Skipped(SkipReason::AlreadyLoaded));
            }
        }

        tokio::pin!(cancel);

        let fetched = tokio::select! {
            biased;
            () = &mut cancel => {
                tracing::info!(page, "page load cancelled");
                return Err(FetchError::Cancelled { page });
            }
            _ = changes.changed() => {
                tracing::info!(page, "page load cancelled by navigation");
                return Err(FetchError::Cancelled { page });
            }
            result = self.fetch_page(page) => result,
        };

        let (range, posts) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(page, error = %e, "page discarded");
                return Err(e);
            }
        };

        let mut state = self.state.lock().await;
        if *self.generation.borrow() != generation {
            return Err(FetchError::Cancelled { page });
        }
        state.cursor.advance(page, range);
        state.exhausted = range.is_none_or(|r| r.is_final());
        self.store.write().await.insert_all(posts.iter().cloned());

        tracing::info!(
            page,
            count = posts.len(),
            exhausted = state.exhausted,
            "page loaded"
        );

        Ok(PageOutcome::Loaded(FeedPage {
            page,
            range,
            posts,
            exhausted: state.exhausted,
        }))
    }

    /// Fetch every post of `page`, discarding all of them if any one fails.
    async fn fetch_page(&self, page: u64) -> Result<(Option<PageRange>, Vec<Post>), FetchError> {
        let discard = |fetched: usize, source: FetchError| FetchError::PageDiscarded {
            page,
            fetched,
            source: Box::new(source),
        };

        let total = bounded(self.config.request_timeout, async {
            self.session
                .ledger()
                .total_count()
                .await
                .map_err(FetchError::from)
        })
        .await
        .map_err(|e| discard(0, e))?;

        let range = self.state.lock().await.cursor.range_for(total, page);
        let Some(range) = range else {
            return Ok((None, Vec::new()));
        };
        tracing::debug!(page, total, start = range.start, end = range.end, "fetching page");

        let mut posts = Vec::with_capacity(range.len());
        let mut results = futures::stream::iter(range.indices())
            .map(|index| self.projector.fetch(index))
            .buffered(self.config.fetch_concurrency.max(1));

        while let Some(result) = results.next().await {
            match result {
                Ok(post) => posts.push(post),
                Err(e) => return Err(discard(posts.len(), e)),
            }
        }

        Ok((Some(range), posts))
    }

    /// Cancel any running load, e.g. when the user leaves the feed.
    pub fn navigate_away(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    /// Cancel any running load and forget all pages, starting over at page 1.
    pub async fn reload(&self) {
        self.navigate_away();
        let _guard = self.in_flight.lock().await;
        let mut state = self.state.lock().await;
        state.cursor = Cursor::new(self.config.page_size);
        state.exhausted = false;
        self.store.write().await.clear();
        tracing::info!("feed reset");
    }

    /// Wait until no load is running.
    async fn wait_idle(&self) {
        drop(self.in_flight.lock().await);
    }

    /// Stream pages from the cursor onwards until the feed is exhausted.
    pub fn pages(
        self: Arc<Self>,
    ) -> Pin<Box<dyn Stream<Item = Result<FeedPage, FetchError>> + Send + 'static>> {
        Box::pin(async_stream::try_stream! {
            loop {
                match self.load_next().await? {
                    PageOutcome::Loaded(page) => {
                        let done = page.exhausted;
                        yield page;
                        if done {
                            break;
                        }
                    }
                    PageOutcome::Skipped(SkipReason::InFlight) => self.wait_idle().await,
                    PageOutcome::Skipped(_) => break,
                }
            }
        })
    }
}
