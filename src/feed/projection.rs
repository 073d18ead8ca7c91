// ABOUTME: Post projection - turns a raw ledger record into a display-ready Post
// ABOUTME: by resolving the author's avatar and the viewer's like state.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::error::FetchError;
use crate::ledger::{Identity, RawPost};
use crate::session::Session;

/// A post ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub index: u64,
    pub author: Identity,
    pub content: String,
    /// Unix seconds.
    pub created_at: u64,
    pub like_count: u64,
    pub liked_by_viewer: bool,
    /// `None` when the author never registered an avatar.
    pub avatar_url: Option<String>,
}

/// Enriches raw records for the session's viewer.
#[derive(Clone)]
pub struct PostProjector {
    session: Session,
    timeout: Duration,
}

impl PostProjector {
    pub fn new(session: Session, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    /// Project a record. A failed lookup fails the whole post; nothing is retried.
    /// An author without an avatar is not a failure.
    pub async fn project(&self, raw: RawPost) -> Result<Post, FetchError> {
        let avatar_url = bounded(
            self.timeout,
            self.session.avatars().resolve_avatar(&raw.author),
        )
        .await?;
        let liked_by_viewer = bounded(self.timeout, async {
            self.session
                .ledger()
                .has_liked(raw.index, self.session.identity())
                .await
                .map_err(FetchError::from)
        })
        .await?;

        Ok(Post {
            index: raw.index,
            author: raw.author,
            content: raw.content,
            created_at: raw.created_at,
            like_count: raw.like_count,
            liked_by_viewer,
            avatar_url,
        })
    }

    /// Read the record at `index` and project it.
    pub async fn fetch(&self, index: u64) -> Result<Post, FetchError> {
        let raw = bounded(self.timeout, async {
            self.session
                .ledger()
                .get_record(index)
                .await
                .map_err(FetchError::from)
        })
        .await?;
        tracing::debug!(index, author = %raw.author, "fetched post");
        self.project(raw).await
    }
}

/// Run `fut`, failing with `FetchError::Timeout` once `limit` has elapsed.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(limit)),
    }
}
