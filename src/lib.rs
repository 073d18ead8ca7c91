// ABOUTME: Root module for feedsync - paginated feed sync over a ledger-backed
// ABOUTME: social contract. Re-exports the public types of every submodule.

pub mod actions;
pub mod avatar;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod prelude;
pub mod session;

#[cfg(test)]
mod test_support;

pub use error::FeedError;
