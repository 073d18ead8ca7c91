// ABOUTME: Dashboard - explicit intent/event dispatch between a rendering
// ABOUTME: surface and the feed coordinator and action submitter.

mod notice;

pub use notice::*;

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use crate::actions::{ActionSubmitter, Clipboard, LikeOutcome};
use crate::config::FeedConfig;
use crate::error::{FetchError, TransactionError};
use crate::feed::{FeedCoordinator, FeedPage, FeedStore, PageOutcome, Post};
use crate::session::{Profile, Session};

/// Something the user did on the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// The dashboard was opened: load the profile header and page 1.
    Open,
    /// The scroll position changed.
    Scrolled {
        viewport_bottom: f64,
        content_height: f64,
    },
    /// Explicit request for the next page.
    LoadMore,
    ToggleLike {
        index: u64,
    },
    CreatePost {
        content: String,
    },
    Share {
        index: u64,
    },
    /// Drop everything loaded and start over at page 1.
    Reload,
    /// The user left the feed; abort any running load.
    NavigateAway,
}

/// Something the rendering surface should show.
#[derive(Debug, Clone)]
pub enum Event {
    Profile(Profile),
    PageLoaded(FeedPage),
    /// No more pages; stop sending scroll intents.
    FeedExhausted,
    LikeUpdated(LikeOutcome),
    PostCreated(Post),
    LinkCopied {
        link: String,
    },
    Notice(Notification),
}

/// True when the viewport is within `threshold` of the end of the content.
pub fn near_bottom(viewport_bottom: f64, content_height: f64, threshold: f64) -> bool {
    viewport_bottom >= content_height - threshold
}

/// Routes intents to the coordinator and submitter and turns every outcome,
/// including failures, into events. No error escapes; the dashboard stays usable.
pub struct Dashboard {
    coordinator: Arc<FeedCoordinator>,
    submitter: ActionSubmitter,
    clipboard: Arc<dyn Clipboard>,
    config: FeedConfig,
}

impl Dashboard {
    pub fn new(session: Session, config: FeedConfig, clipboard: Arc<dyn Clipboard>) -> Self {
        let store = Arc::new(RwLock::new(FeedStore::new()));
        let coordinator = Arc::new(FeedCoordinator::with_store(
            session.clone(),
            config.clone(),
            store.clone(),
        ));
        let submitter = ActionSubmitter::new(session, store, &config);
        Self {
            coordinator,
            submitter,
            clipboard,
            config,
        }
    }

    pub fn coordinator(&self) -> &Arc<FeedCoordinator> {
        &self.coordinator
    }

    /// Handle one intent to completion and return the events it produced, in order.
    pub async fn dispatch(&self, intent: Intent) -> Vec<Event> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.handle(intent, &tx).await;
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    /// Process intents until the sender closes, each in its own task, so a
    /// like is not held up behind a page load.
    pub async fn run(
        self: Arc<Self>,
        mut intents: mpsc::Receiver<Intent>,
        events: mpsc::UnboundedSender<Event>,
    ) {
        while let Some(intent) = intents.recv().await {
            let dashboard = self.clone();
            let events = events.clone();
            tokio::spawn(async move { dashboard.handle(intent, &events).await });
        }
        self.coordinator.navigate_away();
    }

    async fn handle(&self, intent: Intent, events: &mpsc::UnboundedSender<Event>) {
        let emit = |event: Event| {
            // A closed receiver means the surface is gone; nothing left to show.
            let _ = events.send(event);
        };

        match intent {
            Intent::Open => {
                match self.coordinator.session().profile().await {
                    Ok(profile) => emit(Event::Profile(profile)),
                    Err(e) => {
                        tracing::warn!(error = %e, "profile lookup failed");
                        emit(self.error_notice("Failed to load profile."));
                    }
                }
                let outcome = self.coordinator.load_page(1).await;
                self.emit_load(outcome, &emit);
            }
            Intent::Scrolled {
                viewport_bottom,
                content_height,
            } => {
                if near_bottom(viewport_bottom, content_height, self.config.scroll_threshold)
                    && !self.coordinator.is_exhausted().await
                {
                    let outcome = self.coordinator.load_next().await;
                    self.emit_load(outcome, &emit);
                }
            }
            Intent::LoadMore => {
                let outcome = self.coordinator.load_next().await;
                self.emit_load(outcome, &emit);
            }
            Intent::ToggleLike { index } => match self.submitter.submit_like(index).await {
                Ok(outcome) => emit(Event::LikeUpdated(outcome)),
                Err(e) => {
                    tracing::warn!(index, error = %e, "like failed");
                    emit(self.error_notice("Failed to update like. Please try again."));
                }
            },
            Intent::CreatePost { content } => {
                if content.trim().is_empty() {
                    return;
                }
                emit(Event::Notice(Notification::info(
                    "Creating post...",
                    self.config.notice_ttl,
                )));
                match self.submitter.submit_create(&content).await {
                    Ok(post) => {
                        emit(Event::PostCreated(post));
                        emit(Event::Notice(Notification::success(
                            "Post created successfully!",
                            self.config.notice_ttl,
                        )));
                    }
                    Err(TransactionError::Rejected(reason)) => {
                        tracing::info!(%reason, "post rejected in wallet");
                        emit(self.error_notice("Post was rejected in the wallet."));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "create post failed");
                        emit(self.error_notice("Failed to create post. Please try again."));
                    }
                }
            }
            Intent::Share { index } => {
                match self.submitter.share(index, self.clipboard.as_ref()).await {
                    Ok(link) => {
                        emit(Event::LinkCopied { link });
                        emit(Event::Notice(Notification::success(
                            "Link copied to clipboard",
                            self.config.notice_ttl,
                        )));
                    }
                    Err(e) => {
                        tracing::warn!(index, error = %e, "share failed");
                        emit(self.error_notice("Failed to copy link. Please try again."));
                    }
                }
            }
            Intent::Reload => {
                self.coordinator.reload().await;
                let outcome = self.coordinator.load_next().await;
                self.emit_load(outcome, &emit);
            }
            Intent::NavigateAway => self.coordinator.navigate_away(),
        }
    }

    fn emit_load(&self, outcome: Result<PageOutcome, FetchError>, emit: &impl Fn(Event)) {
        match outcome {
            Ok(PageOutcome::Loaded(page)) => {
                let exhausted = page.exhausted;
                emit(Event::PageLoaded(page));
                if exhausted {
                    emit(Event::FeedExhausted);
                }
            }
            Ok(PageOutcome::Skipped(reason)) => {
                tracing::debug!(?reason, "load skipped");
            }
            Err(FetchError::Cancelled { page }) => {
                tracing::debug!(page, "load cancelled");
            }
            Err(_) => emit(self.error_notice("Failed to load posts. Please try again.")),
        }
    }

    fn error_notice(&self, message: &str) -> Event {
        Event::Notice(Notification::error(message, self.config.notice_ttl))
    }
}
