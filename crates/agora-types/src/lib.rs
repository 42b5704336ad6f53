//! Foundation types for the Agora engine.
//!
//! This crate provides the identity and record types shared by every other
//! Agora crate. Records reference each other by identity only; there are no
//! aliasing pointers between entities, so a mutation made through one path
//! is visible through every other path once it lands in the store.
//!
//! # Key Types
//!
//! - [`UserId`], [`PostId`], [`CommentId`] — monotonic integer identities
//! - [`User`], [`Community`], [`Post`], [`Comment`], [`Message`] — canonical records
//! - [`Vote`] — signed vote direction
//! - [`ActionKind`] — classification used by the aggregate counters

pub mod action;
pub mod identity;
pub mod records;

pub use action::{ActionKind, Vote};
pub use identity::{CommentId, PostId, UserId};
pub use records::{Comment, Community, Message, Post, User};
