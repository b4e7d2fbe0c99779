//! Lendwatch chain interaction layer.
//!
//! This crate provides:
//! - A Sui JSON-RPC client with automatic endpoint fallback
//! - The `ProtocolAdapter` trait and the AlphaLend implementation,
//!   including the process-lifetime market metadata cache
//!
//! All blocking I/O lives here; raw data is decoded and handed to the
//! pure core for valuation.

mod adapter;
mod rpc;

pub use adapter::{AlphaLendAdapter, ProtocolAdapter};
pub use rpc::{RpcError, SuiRpcClient};
