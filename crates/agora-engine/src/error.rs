use agora_store::StoreError;

/// Errors produced by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A store-level rejection or "not found" outcome.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A thread panicked while holding the engine lock.
    #[error("engine {0} lock poisoned")]
    LockPoisoned(&'static str),
}

impl EngineError {
    /// Returns `true` if an operation referenced an unknown identity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Store(e) if e.is_not_found())
    }

    /// Returns `true` if a creation collided with an existing key.
    pub fn is_rejected(&self) -> bool {
        matches!(self, EngineError::Store(StoreError::CommunityExists(_)))
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
