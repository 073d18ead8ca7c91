// ABOUTME: Feed module - cursor arithmetic, post projection, the shared post
// ABOUTME: store, and the coordinator that pages through the ledger.

mod coordinator;
mod cursor;
mod projection;
mod store;

pub use coordinator::*;
pub use cursor::*;
pub use projection::*;
pub use store::*;
