//! Comment-thread projection over the comment arena.
//!
//! A thread is returned flat, in pre-order, with each comment's nesting
//! depth. No value in the projection is recursive, so reply depth is bounded
//! only by memory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use agora_types::{Comment, CommentId};

/// One comment in a thread listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadEntry {
    /// 0 for a top-level comment, parent depth + 1 for a reply.
    pub depth: usize,
    pub comment: Comment,
}

/// Walk the arena from `roots` in pre-order: each comment is followed by its
/// replies, siblings in insertion order.
pub(crate) fn flatten(
    comments: &HashMap<CommentId, Comment>,
    roots: &[CommentId],
) -> Vec<ThreadEntry> {
    let mut entries = Vec::new();
    let mut stack: Vec<(usize, CommentId)> = roots.iter().rev().map(|id| (0, *id)).collect();

    while let Some((depth, id)) = stack.pop() {
        let Some(comment) = comments.get(&id) else {
            continue;
        };
        stack.extend(comment.replies.iter().rev().map(|reply| (depth + 1, *reply)));
        entries.push(ThreadEntry {
            depth,
            comment: comment.clone(),
        });
    }

    entries
}

/// Depth of the deepest entry plus one; 0 for an empty thread.
pub fn thread_depth(entries: &[ThreadEntry]) -> usize {
    entries.iter().map(|e| e.depth + 1).max().unwrap_or(0)
}
