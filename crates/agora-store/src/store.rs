//! The [`EntityStore`]: canonical storage and identity-based lookup.
//!
//! # Invariants
//!
//! - Every post id appears in exactly one community's post list.
//! - Every comment id appears in exactly one parent list: its post's
//!   top-level comments or its parent comment's replies.
//! - `community_index[name]` is the position of that community in
//!   `communities`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::trace;

use agora_types::{Comment, CommentId, Community, Message, Post, PostId, User, UserId};

use crate::error::{StoreError, StoreResult};
use crate::sequence::IdSequence;
use crate::thread::{flatten, ThreadEntry};

/// Where a new comment attaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentParent {
    /// A top-level comment on a post.
    Post(PostId),
    /// A reply nested under another comment.
    Comment(CommentId),
}

/// Canonical in-memory storage for every Agora entity.
#[derive(Debug, Default)]
pub struct EntityStore {
    users: BTreeMap<UserId, User>,
    /// Communities in creation order.
    communities: Vec<Community>,
    community_index: HashMap<String, usize>,
    posts: HashMap<PostId, Post>,
    comments: HashMap<CommentId, Comment>,
    messages: Vec<Message>,
    user_ids: IdSequence,
    post_ids: IdSequence,
    comment_ids: IdSequence,
}

impl EntityStore {
    /// Create an empty store. All id sequences start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    pub fn community(&self, name: &str) -> Option<&Community> {
        self.community_index
            .get(name)
            .and_then(|&index| self.communities.get(index))
    }

    pub fn community_mut(&mut self, name: &str) -> Option<&mut Community> {
        match self.community_index.get(name) {
            Some(&index) => self.communities.get_mut(index),
            None => None,
        }
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn post_mut(&mut self, id: PostId) -> Option<&mut Post> {
        self.posts.get_mut(&id)
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.get(&id)
    }

    pub fn comment_mut(&mut self, id: CommentId) -> Option<&mut Comment> {
        self.comments.get_mut(&id)
    }

    /// Like [`user`](Self::user) but reports a miss as [`StoreError::UserNotFound`].
    pub fn require_user(&self, id: UserId) -> StoreResult<&User> {
        self.user(id).ok_or(StoreError::UserNotFound(id))
    }

    pub fn require_user_mut(&mut self, id: UserId) -> StoreResult<&mut User> {
        self.user_mut(id).ok_or(StoreError::UserNotFound(id))
    }

    // ---------------------------------------------------------------
    // Insertion
    // ---------------------------------------------------------------

    /// Register a user under the next user id. Always succeeds.
    pub fn insert_user(&mut self, name: impl Into<String>) -> &User {
        let id = UserId::new(self.user_ids.next_id());
        trace!(user = %id, "inserted user");
        self.users.entry(id).or_insert_with(|| User::new(id, name))
    }

    /// Create an empty community. Rejected if the name is taken.
    pub fn insert_community(&mut self, name: &str) -> StoreResult<&Community> {
        if self.community_index.contains_key(name) {
            return Err(StoreError::CommunityExists(name.to_string()));
        }

        let index = self.communities.len();
        self.communities.push(Community::new(name));
        self.community_index.insert(name.to_string(), index);
        trace!(community = name, "inserted community");
        Ok(&self.communities[index])
    }

    /// Insert a post under the next post id and append it to the owning
    /// community's post list.
    ///
    /// Nothing is allocated or modified unless the author, the community,
    /// and the repost source (if any) all exist.
    pub fn insert_post(
        &mut self,
        author: UserId,
        community: &str,
        content: impl Into<String>,
        reposted_from: Option<PostId>,
    ) -> StoreResult<&Post> {
        self.require_user(author)?;
        if let Some(source) = reposted_from {
            if !self.posts.contains_key(&source) {
                return Err(StoreError::PostNotFound(source));
            }
        }
        let owner = match self.community_index.get(community) {
            Some(&index) => &mut self.communities[index],
            None => return Err(StoreError::CommunityNotFound(community.to_string())),
        };

        let id = PostId::new(self.post_ids.next_id());
        owner.posts.push(id);

        let post = Post {
            id,
            author,
            community: owner.name.clone(),
            content: content.into(),
            votes: 0,
            comments: Vec::new(),
            reposted_from,
        };
        trace!(post = %id, community, "inserted post");
        Ok(self.posts.entry(id).or_insert(post))
    }

    /// Insert a comment under the next comment id and link it into its
    /// parent's child list.
    pub fn insert_comment(
        &mut self,
        author: UserId,
        parent: CommentParent,
        content: impl Into<String>,
    ) -> StoreResult<&Comment> {
        self.require_user(author)?;

        let (id, post, parent_comment) = match parent {
            CommentParent::Post(post_id) => {
                let post = self
                    .posts
                    .get_mut(&post_id)
                    .ok_or(StoreError::PostNotFound(post_id))?;
                let id = CommentId::new(self.comment_ids.next_id());
                post.comments.push(id);
                (id, post_id, None)
            }
            CommentParent::Comment(parent_id) => {
                let parent = self
                    .comments
                    .get_mut(&parent_id)
                    .ok_or(StoreError::CommentNotFound(parent_id))?;
                let id = CommentId::new(self.comment_ids.next_id());
                parent.replies.push(id);
                (id, parent.post, Some(parent_id))
            }
        };

        let comment = Comment {
            id,
            author,
            post,
            parent: parent_comment,
            content: content.into(),
            votes: 0,
            replies: Vec::new(),
        };
        trace!(comment = %id, post = %post, "inserted comment");
        Ok(self.comments.entry(id).or_insert(comment))
    }

    /// Append a message to the log. Both users must exist.
    pub fn append_message(
        &mut self,
        from: UserId,
        to: UserId,
        content: impl Into<String>,
    ) -> StoreResult<&Message> {
        self.require_user(from)?;
        self.require_user(to)?;

        let index = self.messages.len();
        self.messages.push(Message {
            from,
            to,
            content: content.into(),
        });
        Ok(&self.messages[index])
    }

    // ---------------------------------------------------------------
    // Enumeration
    // ---------------------------------------------------------------

    /// All users in id order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// All communities in creation order.
    pub fn communities(&self) -> impl Iterator<Item = &Community> {
        self.communities.iter()
    }

    /// The full message log in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn community_count(&self) -> usize {
        self.communities.len()
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    // ---------------------------------------------------------------
    // Read-time projections
    // ---------------------------------------------------------------

    /// Posts of every community `user` belongs to: communities in creation
    /// order, then posts in insertion order.
    pub fn feed(&self, user: UserId) -> StoreResult<Vec<&Post>> {
        self.require_user(user)?;
        Ok(self
            .communities
            .iter()
            .filter(|community| community.is_member(user))
            .flat_map(|community| community.posts.iter())
            .filter_map(|id| self.posts.get(id))
            .collect())
    }

    /// Messages addressed to `user`, in log order.
    pub fn inbox(&self, user: UserId) -> StoreResult<Vec<&Message>> {
        self.require_user(user)?;
        Ok(self.messages.iter().filter(|m| m.to == user).collect())
    }

    /// The full comment thread under a post, in pre-order with depths.
    pub fn thread(&self, post: PostId) -> StoreResult<Vec<ThreadEntry>> {
        let post = self.post(post).ok_or(StoreError::PostNotFound(post))?;
        Ok(flatten(&self.comments, &post.comments))
    }
}
