use agora_types::{CommentId, PostId, UserId};

/// Errors from entity store operations.
///
/// `CommunityExists` is the "rejected" outcome of a creation that collided
/// with an existing key. Every other variant is a "not found" outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A community with this name already exists.
    #[error("community already exists: {0}")]
    CommunityExists(String),

    #[error("community not found: {0}")]
    CommunityNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("post not found: {0}")]
    PostNotFound(PostId),

    #[error("comment not found: {0}")]
    CommentNotFound(CommentId),
}

impl StoreError {
    /// Returns `true` for every "not found" outcome.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, StoreError::CommunityExists(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
