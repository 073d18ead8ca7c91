// ABOUTME: Share links and the clipboard seam they are written to.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ClipboardError;

/// Link that opens a single shared post.
pub fn share_link(origin: &str, index: u64) -> String {
    format!(
        "{}/sharepost/display_shared_post.html?postid={}",
        origin.trim_end_matches('/'),
        index
    )
}

/// Destination for copied text.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard that keeps the last copied text in memory.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently copied text.
    pub async fn contents(&self) -> Option<String> {
        self.contents.lock().await.clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock().await = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_link_format() {
        assert_eq!(
            share_link("https://feed.example/", 7),
            "https://feed.example/sharepost/display_shared_post.html?postid=7"
        );
    }

    #[test]
    fn test_memory_clipboard_keeps_last() {
        tokio_test::block_on(async {
            let clipboard = MemoryClipboard::new();
            assert_eq!(clipboard.contents().await, None);
            clipboard.write_text("a").await.unwrap();
            clipboard.write_text("b").await.unwrap();
            assert_eq!(clipboard.contents().await.as_deref(), Some("b"));
        });
    }
}
