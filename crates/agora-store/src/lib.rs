//! Canonical entity storage for the Agora engine.
//!
//! [`EntityStore`] owns the single authoritative copy of every user,
//! community, post, comment, and message. Posts and comments live in arenas
//! keyed by id; communities and parent records hold id lists rather than
//! embedded copies, so there is never more than one copy of a record to
//! keep in sync.
//!
//! The store itself is single-threaded (`&mut self` mutation). The engine
//! crate wraps it in a lock to provide the shared, serialized surface.
//!
//! # Design Rules
//!
//! 1. Ids come from three independent monotonic sequences and are never reused.
//! 2. Inserts hand back a reference to the stored record, never a copy.
//! 3. Unknown identities are reported as [`StoreError`] values, never panics.
//! 4. Enumeration order is deterministic: users by id, communities in
//!    creation order, messages in log order.

pub mod error;
pub mod sequence;
pub mod store;
pub mod thread;

pub use error::{StoreError, StoreResult};
pub use sequence::IdSequence;
pub use store::{CommentParent, EntityStore};
pub use thread::{thread_depth, ThreadEntry};
