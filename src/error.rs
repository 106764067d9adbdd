use std::{collections::TryReserveError, io, string::FromUtf8Error};

use async_std::path::{Path, PathBuf};

/// Coarse classification of an [`Error`]. Several variants can share a kind, e.g. every malformed
/// line number typed by a user is an `InvalidInput`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Memory,
    Open,
    Read,
    Seek,
    Write,
    InvalidInput,
    LineNotFound,
    MalformedIndex,
    Encoding,
    Config,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Growing a buffer or the index failed
    #[error("cannot reserve memory for {additional} more {what}: {source}")]
    Memory {
        what: &'static str,
        additional: usize,
        source: TryReserveError,
    },
    #[error("cannot open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("error while reading {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot move the cursor of {} to offset {offset}: {source}", .path.display())]
    Seek {
        path: PathBuf,
        offset: u64,
        source: io::Error,
    },
    /// Reading a line number from the input failed
    #[error("error while reading a line number: {0}")]
    ReadInput(#[source] io::Error),
    /// Writing the prompt failed
    #[error("error while writing the prompt: {0}")]
    Write(#[source] io::Error),
    /// Writing a fetched line failed
    #[error("printing error: {0}")]
    Print(#[source] io::Error),
    #[error("entered value {input:?} is not a non-negative integer")]
    NotDigit { input: String },
    #[error("entered value has {len} characters, at most {max} digits are allowed")]
    InputTooLong { len: usize, max: usize },
    #[error("entered value is empty")]
    EmptyInput,
    #[error("line {line} does not exist, the file has {total} lines")]
    LineNotFound { line: u64, total: usize },
    /// On a table that is not a contiguous sequence of lines
    #[error("malformed index at entry {entry}: {reason}")]
    MalformedIndex { entry: usize, reason: &'static str },
    #[error("line is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidConfig {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Memory { .. } => ErrorKind::Memory,
            Error::Open { .. } => ErrorKind::Open,
            Error::Read { .. } | Error::ReadInput(_) => ErrorKind::Read,
            Error::Seek { .. } => ErrorKind::Seek,
            Error::Write(_) | Error::Print(_) => ErrorKind::Write,
            Error::NotDigit { .. } | Error::InputTooLong { .. } | Error::EmptyInput => {
                ErrorKind::InvalidInput
            }
            Error::LineNotFound { .. } => ErrorKind::LineNotFound,
            Error::MalformedIndex { .. } => ErrorKind::MalformedIndex,
            Error::Utf8(_) => ErrorKind::Encoding,
            Error::InvalidConfig { .. } => ErrorKind::Config,
        }
    }

    /// Numeric code printed in diagnostics. Stable across releases so scripts can match on it.
    /// `-4` stays reserved for close failures, which dropping a handle never reports.
    pub fn code(&self) -> i32 {
        match self {
            Error::Memory { .. } => -1,
            Error::Open { .. } => -2,
            Error::Read { .. } | Error::ReadInput(_) => -3,
            Error::LineNotFound { .. } => -5,
            Error::Seek { .. } => -6,
            Error::Write(_) => -7,
            Error::NotDigit { .. } | Error::InputTooLong { .. } | Error::EmptyInput => -8,
            Error::Print(_) => -9,
            Error::MalformedIndex { .. } => -10,
            Error::Utf8(_) => -11,
            Error::InvalidConfig { .. } => -12,
        }
    }

    /// Returns `true` if the error came from prompting for or parsing a line number, as opposed to
    /// fetching or printing a line.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::ReadInput(_)
                | Error::Write(_)
                | Error::NotDigit { .. }
                | Error::InputTooLong { .. }
                | Error::EmptyInput
        )
    }

    /// Attaches `path` to file related errors raised by code that only saw a reader.
    pub(crate) fn at_path(self, path: &Path) -> Self {
        match self {
            Error::Open { source, .. } => Error::Open {
                path: path.to_path_buf(),
                source,
            },
            Error::Read { source, .. } => Error::Read {
                path: path.to_path_buf(),
                source,
            },
            Error::Seek { offset, source, .. } => Error::Seek {
                path: path.to_path_buf(),
                offset,
                source,
            },
            e => e,
        }
    }
}
