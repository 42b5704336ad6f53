//! Canonical record types.
//!
//! Each record has exactly one stored copy inside the entity store. Values of
//! these types handed out by the engine are snapshots of that copy; further
//! mutation always goes through the record's identity.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identity::{CommentId, PostId, UserId};

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Net votes across every post this user authored. May be negative.
    pub karma: i64,
    /// Number of counted actions this user performed.
    pub actions: u64,
    pub connected: bool,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            karma: 0,
            actions: 0,
            connected: true,
        }
    }
}

/// A named group with a member set and an owned post collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    /// Unique name; acts as the primary key.
    pub name: String,
    /// Posts in insertion order.
    pub posts: Vec<PostId>,
    pub members: BTreeSet<UserId>,
}

impl Community {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            posts: Vec::new(),
            members: BTreeSet::new(),
        }
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }
}

/// A post owned by exactly one community.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: UserId,
    /// Name of the owning community.
    pub community: String,
    pub content: String,
    /// Net vote count. No floor.
    pub votes: i64,
    /// Top-level comments in insertion order.
    pub comments: Vec<CommentId>,
    /// Source post when this post is a repost.
    pub reposted_from: Option<PostId>,
}

/// A comment on a post, or a reply to another comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: UserId,
    /// Post at the root of this comment's thread.
    pub post: PostId,
    /// Parent comment; `None` for top-level comments.
    pub parent: Option<CommentId>,
    pub content: String,
    pub votes: i64,
    /// Direct replies in insertion order.
    pub replies: Vec<CommentId>,
}

/// A direct message. Append-only; there is no delivery or read state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: UserId,
    pub to: UserId,
    pub content: String,
}
