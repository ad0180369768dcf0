//! Error types for the reader primitive and the tag session.

use std::string::FromUtf8Error;

use thiserror::Error;

/// Failures reported by a [`Reader`](crate::reader::Reader) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    #[error("select failed: {0}")]
    Select(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),
}

impl ReaderError {
    pub fn into_message(self) -> String {
        match self {
            ReaderError::Select(msg) | ReaderError::Read(msg) | ReaderError::Write(msg) => msg,
        }
    }
}

/// Errors surfaced by an [`Ntag`](crate::session::Ntag) session.
///
/// `Write` covers both an unselected session and a block index outside the
/// user area. Use [`NtagError::is_not_selected`] to tell them apart.
#[derive(Error, Debug)]
pub enum NtagError {
    #[error("{0}")]
    Select(String),

    #[error("{0}")]
    Read(String),

    #[error("{0}")]
    Write(String),

    #[error("Payload too big: block {block} is past the last writable block {}", .end - 1)]
    Overflow { block: u16, end: u16 },

    #[error("tag content is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

pub(crate) const NOT_SELECTED: &str = "No tag selected";
pub(crate) const NOT_NTAG: &str = "not a valid NTAG21x tag";

impl NtagError {
    pub(crate) fn not_selected() -> Self {
        NtagError::Write(NOT_SELECTED.to_string())
    }

    pub(crate) fn not_ntag() -> Self {
        NtagError::Select(NOT_NTAG.to_string())
    }

    /// True when the error came from using a session before `select`.
    pub fn is_not_selected(&self) -> bool {
        matches!(self, NtagError::Write(msg) if msg == NOT_SELECTED)
    }
}

impl From<ReaderError> for NtagError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::Select(msg) => NtagError::Select(msg),
            ReaderError::Read(msg) => NtagError::Read(msg),
            ReaderError::Write(msg) => NtagError::Write(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, NtagError>;
