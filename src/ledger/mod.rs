// ABOUTME: Ledger module - consumed contracts of the post ledger, profile
// ABOUTME: registry and identity provider, with RPC and in-memory backends.

mod client;
mod memory;
mod rpc;
mod types;

pub use client::*;
pub use memory::*;
pub use rpc::{RpcErrorObject, RpcLedger, RpcRequest, RpcResponse};
pub use types::*;
