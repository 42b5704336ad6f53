//! Mutation and query boundaries of the engine.

use agora_store::ThreadEntry;
use agora_types::{Comment, CommentId, Community, Message, Post, PostId, User, UserId, Vote};

use crate::counters::Counters;
use crate::error::EngineResult;
use crate::report::EngineReport;

/// State-transition operations.
///
/// Each call is one atomic step: it either applies completely, including its
/// counter updates, or returns an error without changing anything.
pub trait SocialWriter: Send + Sync {
    /// Register a user under the next user id. Always succeeds.
    fn register_user(&self, name: &str) -> EngineResult<User>;

    /// Create an empty community. Rejected if the name already exists.
    fn create_community(&self, name: &str) -> EngineResult<Community>;

    /// Add `user` to the community's member set.
    ///
    /// Returns `Ok(true)` if the user was added and `Ok(false)` if they were
    /// already a member. Both count as a join action.
    fn join_community(&self, user: UserId, community: &str) -> EngineResult<bool>;

    /// Remove `user` from the community's member set.
    ///
    /// Returns `Ok(true)` if the user was removed and `Ok(false)` if they
    /// were not a member. Both count as a leave action.
    fn leave_community(&self, user: UserId, community: &str) -> EngineResult<bool>;

    fn create_post(&self, author: UserId, community: &str, content: &str) -> EngineResult<Post>;

    /// Create a new post in `community` whose content is copied from `source`.
    fn repost(&self, author: UserId, source: PostId, community: &str) -> EngineResult<Post>;

    fn comment_on_post(&self, author: UserId, post: PostId, content: &str)
        -> EngineResult<Comment>;

    fn reply_to_comment(
        &self,
        author: UserId,
        parent: CommentId,
        content: &str,
    ) -> EngineResult<Comment>;

    /// Adjust a post's vote count and its author's karma by the vote's delta.
    fn vote_post(&self, post: PostId, vote: Vote) -> EngineResult<Post>;

    fn upvote(&self, post: PostId) -> EngineResult<Post> {
        self.vote_post(post, Vote::Up)
    }

    fn downvote(&self, post: PostId) -> EngineResult<Post> {
        self.vote_post(post, Vote::Down)
    }

    /// Adjust a comment's vote count. Karma is unaffected.
    fn vote_comment(&self, comment: CommentId, vote: Vote) -> EngineResult<Comment>;

    fn send_message(&self, from: UserId, to: UserId, content: &str) -> EngineResult<Message>;

    /// Send a message back to the sender of `original`.
    ///
    /// This is a separate step from whatever produced `original`; it is not
    /// atomic with anything else.
    fn reply_to_message(
        &self,
        user: UserId,
        original: &Message,
        content: &str,
    ) -> EngineResult<Message> {
        self.send_message(user, original.from, content)
    }

    /// Set a user's connectivity flag. Returns `true` if the flag changed.
    fn set_connected(&self, user: UserId, connected: bool) -> EngineResult<bool>;
}

/// Read-only projections. Nothing here mutates engine state.
pub trait SocialReader: Send + Sync {
    fn user(&self, id: UserId) -> EngineResult<Option<User>>;

    fn community(&self, name: &str) -> EngineResult<Option<Community>>;

    fn post(&self, id: PostId) -> EngineResult<Option<Post>>;

    fn comment(&self, id: CommentId) -> EngineResult<Option<Comment>>;

    /// Posts of every community the user belongs to, communities in creation
    /// order, then posts in insertion order.
    fn feed(&self, user: UserId) -> EngineResult<Vec<Post>>;

    /// Messages addressed to the user, in log order.
    fn inbox(&self, user: UserId) -> EngineResult<Vec<Message>>;

    /// Every comment under `post` in pre-order, each with its reply depth.
    fn thread(&self, post: PostId) -> EngineResult<Vec<ThreadEntry>>;

    /// The full message log.
    fn messages(&self) -> EngineResult<Vec<Message>>;

    /// All users in id order.
    fn users(&self) -> EngineResult<Vec<User>>;

    fn counters(&self) -> EngineResult<Counters>;

    fn report(&self) -> EngineResult<EngineReport>;
}
