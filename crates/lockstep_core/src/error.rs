//! # Loop Error Types
//!
//! Fatal conditions of the mini-loop and of configuration loading.
//! Transient network stalls are not errors; the scheduler waits them out.

use std::path::PathBuf;

use lockstep_bsp::BspError;
use thiserror::Error;

/// Unrecoverable scheduler failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoopError {
    /// The network reported fewer synchronized tics than were already run.
    #[error("low tic {low_tic} fell behind game tic {game_tic}")]
    LowTicBehind {
        /// Synchronized tic reported by the network.
        low_tic: i32,
        /// Logical tic already simulated.
        game_tic: i32,
    },

    /// A tic was about to run without every player's command.
    #[error("game tic {game_tic} ran ahead of low tic {low_tic}")]
    GameTicAhead {
        /// Logical tic about to be simulated.
        game_tic: i32,
        /// Synchronized tic reported by the network.
        low_tic: i32,
    },

    /// Level geometry failed validation.
    #[error(transparent)]
    Bsp(#[from] BspError),
}

/// Result type for scheduler operations.
pub type LoopResult<T> = Result<T, LoopError>;

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
