//! User-facing validation errors.
//!
//! Plumbing failures (I/O, HTTP, config) travel as `anyhow::Error`. The
//! variants here are the conditions a caller is expected to report to the
//! user and then carry on.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WurpError {
    #[error("AI prompt must not be empty")]
    EmptyPrompt,

    #[error("Unknown theme: {0}")]
    ThemeNotFound(String),
}
