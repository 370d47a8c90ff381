//! Hand-written protobuf types for frontier checkpoints.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//!
//! ```proto
//! message Term {
//!   bytes factor = 1;              // little-endian magnitude
//!   repeated uint64 legs = 2;
//!   uint64 sources_remaining = 3;
//!   repeated uint64 markers = 4;
//!   repeated uint64 pairings = 5;  // row-major L x L
//! }
//! message Checkpoint {
//!   uint64 round = 1;
//!   uint32 format_version = 2;
//!   repeated Term terms = 3;
//! }
//! ```

use prost::Message;

// ── Term ───────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoTerm {
    #[prost(bytes = "vec", tag = "1")]
    pub factor: Vec<u8>,
    #[prost(uint64, repeated, tag = "2")]
    pub legs: Vec<u64>,
    #[prost(uint64, tag = "3")]
    pub sources_remaining: u64,
    #[prost(uint64, repeated, tag = "4")]
    pub markers: Vec<u64>,
    #[prost(uint64, repeated, tag = "5")]
    pub pairings: Vec<u64>,
}

// ── Checkpoint ─────────────────────────────────────────────────

/// Full frontier after `round` rounds.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoCheckpoint {
    #[prost(uint64, tag = "1")]
    pub round: u64,
    #[prost(uint32, tag = "2")]
    pub format_version: u32,
    #[prost(message, repeated, tag = "3")]
    pub terms: Vec<ProtoTerm>,
}
