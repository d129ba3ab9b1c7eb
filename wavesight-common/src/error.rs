//! Common error types for WaveSight

use thiserror::Error;

/// Common result type for WaveSight operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across WaveSight services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid session credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Voter already has a vote on this submission
    #[error("Duplicate vote: voter {voter} already voted on submission {submission}")]
    DuplicateVote {
        submission: uuid::Uuid,
        voter: uuid::Uuid,
    },

    /// Authors may not vote on their own submissions
    #[error("Self vote: submission {0} belongs to the voter")]
    SelfVote(uuid::Uuid),

    /// Submission already reached a terminal status
    #[error("Submission {submission} is already {status}")]
    AlreadyFinalized {
        submission: uuid::Uuid,
        status: String,
    },

    /// Per-user submission rate limit exceeded
    #[error("Rate limited: {count} submissions in the last hour (limit {limit})")]
    RateLimited { count: i64, limit: i64 },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
