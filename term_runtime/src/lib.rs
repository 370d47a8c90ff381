#![forbid(unsafe_code)]

//! Term counting: Runtime
//!
//! Wraps the kernel with persistence, checkpointing, resumable sessions,
//! replay, and drift detection.
//!
//! No move logic lives here. All branching, admission and aggregation
//! are delegated to the kernel.

pub mod proto_types;
pub mod proto_bridge;
pub mod frontier_store;
pub mod replay;
pub mod snapshot;
pub mod snapshot_codec;
pub mod session;
pub mod drift;
