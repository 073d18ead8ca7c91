// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use feedsync::prelude::*;` to get started quickly.

pub use crate::actions::{ActionSubmitter, Clipboard, LikeOutcome, MemoryClipboard, share_link};
pub use crate::avatar::{AvatarResolver, GatewayAvatarResolver};
pub use crate::config::FeedConfig;
pub use crate::dashboard::{Dashboard, Event, Intent, NoticeLevel, Notification, near_bottom};
pub use crate::error::{
    ClipboardError, ConfigError, ConnectionError, FeedError, FetchError, LedgerError,
    TransactionError,
};
pub use crate::feed::{
    Cursor, FeedCoordinator, FeedPage, FeedStore, PageOutcome, PageRange, Post, PostProjector,
    SkipReason,
};
pub use crate::ledger::{
    Identity, IdentityProvider, Ledger, MemoryLedger, ProfileRegistry, RawPost, Receipt, RpcLedger,
};
pub use crate::session::{Profile, Session};
