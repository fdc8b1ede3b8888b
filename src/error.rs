//! Engine error kinds.
//!
//! Clamps (ease-factor bounds, the one-day interval floor) are designed
//! corrections and never surface here; everything in this enum indicates
//! either caller misuse or a transient conflict that is safe to retry.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("xp award amount must be positive")]
    InvalidAmount,
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("no review state for item {item_id} of user {user_id}")]
    UnknownItem { user_id: String, item_id: String },
    #[error("concurrent update conflict after {attempts} attempts")]
    ConcurrentUpdateConflict { attempts: u32 },
}

pub type EngineResult<T> = Result<T, EngineError>;
