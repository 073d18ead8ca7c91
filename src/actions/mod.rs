// ABOUTME: Actions module - state-changing requests (likes, posts) and sharing.
// ABOUTME: Reconciles the shared store with the ledger's authoritative state.

mod share;
mod submitter;

pub use share::*;
pub use submitter::*;

#[cfg(test)]
mod submitter_test;
