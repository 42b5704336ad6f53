//! Concurrent state engine for Agora.
//!
//! This crate is the synchronization boundary around the entity store. It
//! provides:
//! - `SocialWriter` / `SocialReader` trait boundaries
//! - [`Engine`], which serializes every operation through one `RwLock`
//! - [`Counters`], process-wide tallies updated inside the same critical
//!   section as the mutation that produced them
//! - [`EngineReport`], a read-only projection for reporting layers
//!
//! Records returned by the engine are snapshots taken under the lock. The
//! handle for any further mutation is the record's id, so every mutation
//! lands on the single canonical copy held by the store.

pub mod counters;
pub mod engine;
pub mod error;
pub mod report;
pub mod traits;

pub use agora_store::{thread_depth, CommentParent, StoreError, ThreadEntry};
pub use counters::Counters;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use report::{CommunityStats, EngineReport};
pub use traits::{SocialReader, SocialWriter};
