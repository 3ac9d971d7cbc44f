// ABOUTME: Error types for feed assembly.
// ABOUTME: Provides FeedError with Write and Encoding variants.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while serializing the output feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The XML writer rejected an event.
    #[error("failed to write feed: {0}")]
    Write(String),

    /// The serialized document was not valid UTF-8.
    #[error("feed is not valid UTF-8: {0}")]
    Encoding(String),
}

impl FeedError {
    /// Creates a Write error from an underlying writer error.
    pub fn write(err: impl fmt::Display) -> Self {
        FeedError::Write(err.to_string())
    }

    /// Creates an Encoding error.
    pub fn encoding(err: impl fmt::Display) -> Self {
        FeedError::Encoding(err.to_string())
    }
}
