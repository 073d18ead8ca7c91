// ABOUTME: Shared fixtures for unit tests - identities, a seeded in-memory
// ABOUTME: ledger, and sessions wired to it.

use std::sync::Arc;
use std::time::Duration;

use crate::config::FeedConfig;
use crate::ledger::{Identity, MemoryLedger};
use crate::session::Session;

pub const GATEWAY: &str = "https://gateway.test";

pub fn viewer() -> Identity {
    Identity::parse("0x1111111111111111111111111111111111111111").unwrap()
}

pub fn author() -> Identity {
    Identity::parse("0x2222222222222222222222222222222222222222").unwrap()
}

/// A ledger holding `count` posts by `author()`, each with a registered avatar.
pub async fn seeded_ledger(count: u64) -> Arc<MemoryLedger> {
    let ledger = Arc::new(MemoryLedger::new());
    ledger.set_profile(&author(), "author", "QmAuthor").await;
    ledger.set_profile(&viewer(), "viewer", "QmViewer").await;
    for i in 0..count {
        ledger
            .seed_post(&author(), format!("post #{i}"), 1_700_000_000 + i)
            .await;
    }
    ledger
}

pub fn session_for(ledger: &Arc<MemoryLedger>) -> Session {
    Session::with_gateway(viewer(), ledger.clone(), ledger.clone(), GATEWAY)
}

pub fn test_config() -> FeedConfig {
    FeedConfig::new()
        .page_size(10)
        .request_timeout(Duration::from_secs(5))
        .gateway_origin(GATEWAY)
        .share_origin("https://feed.test")
}
