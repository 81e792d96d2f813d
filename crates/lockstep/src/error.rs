//! Driver error type.

use lockstep_core::{ConfigError, LoopError};
use thiserror::Error;

/// Anything that stops the driver.
#[derive(Error, Debug)]
pub enum LockstepError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The game loop hit a fatal condition.
    #[error("game loop error: {0}")]
    Loop(#[from] LoopError),
}

/// Result type for driver operations.
pub type LockstepResult<T> = Result<T, LockstepError>;
