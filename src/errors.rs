//!
//! src/errors.rs  Andrew Belles  Oct 16th, 2026
//!
//! Defines enums and methods of error conversion
//! for errors the collaborators of the mix sequencer raise
//!
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MixError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

impl From<reqwest::Error> for MixError {
    fn from(e: reqwest::Error) -> Self { MixError::Http(e.to_string()) }
}

impl From<serde_json::Error> for MixError {
    fn from(e: serde_json::Error) -> Self { MixError::Parse(e.to_string()) }
}

impl From<tempfile::PersistError> for MixError {
    fn from(e: tempfile::PersistError) -> Self { MixError::Io(e.error) }
}
