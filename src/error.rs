use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Record-level errors
// ---------------------------------------------------------------------------

/// A single line of a trajectory file violates its record grammar.
#[derive(Error, Debug, PartialEq)]
pub enum MalformedRecordError {
    #[error("record {record}: expected at least {expected} tokens, found {found}")]
    TooFewTokens {
        record: u8,
        expected: usize,
        found: usize,
    },
    #[error("record {record}: expected {expected} tokens, found {found}")]
    TokenCount {
        record: u8,
        expected: usize,
        found: usize,
    },
    #[error("record {record}: field `{field}` is not a number: {token:?}")]
    InvalidNumber {
        record: u8,
        field: &'static str,
        token: String,
    },
    #[error("record 3: unknown direction {0:?} (expected FORWARD or BACKWARD)")]
    UnknownDirection(String),
    #[error("record 5: variable {0:?} declared twice")]
    DuplicateVariable(String),
    #[error("record 6: invalid timestamp {year}-{month:02}-{day:02} {hour:02}:{minute:02}")]
    InvalidTimestamp {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
}

// ---------------------------------------------------------------------------
// File-level errors
// ---------------------------------------------------------------------------

/// A file could not be turned into a [`Traj`](crate::traj::Traj).
///
/// Fatal to that one trajectory; group composition downgrades it to a
/// warning and skips the file.
#[derive(Error, Debug)]
pub enum TrajParseError {
    #[error("cannot read trajectory file: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected end of input while reading record {record}")]
    MissingRecord { record: u8 },
    #[error("line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: MalformedRecordError,
    },
    #[error("trajectory contains no points")]
    NoPoints,
}

// ---------------------------------------------------------------------------
// Crate-level error
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse trajectory {}", path.display())]
    TrajParse {
        path: PathBuf,
        #[source]
        source: TrajParseError,
    },

    #[error("member path {} is neither a file nor a directory", .0.display())]
    PathResolution(PathBuf),

    #[error("reference data unavailable: {0}")]
    ReferenceDataUnavailable(String),

    #[error("cannot read reference table {}", path.display())]
    ReferenceTable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{op} failed for {}", path.display())]
    FileSystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn fs(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Error::FileSystem { op, path, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
