use thiserror::Error;

use crate::model::EnvMap;

/// Errors returned by the acquisition helpers and the loader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid UTF-8 input: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    /// Whether the failure happened while fetching bytes, before any parsing.
    pub fn is_acquisition(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Http(_) | Self::HttpStatus { .. })
    }
}

/// A line that could not be split into a key and a value.
///
/// Parsing stops at the first malformed line. The entries parsed from the
/// lines before it are kept in [`ParseError::partial`].
///
/// The message only names the line number: values routinely hold secrets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line}: {kind}")]
pub struct ParseError {
    pub line: u32,
    pub kind: ParseErrorKind,
    partial: EnvMap,
}

impl ParseError {
    pub(crate) fn new(line: u32, kind: ParseErrorKind, partial: EnvMap) -> Self {
        Self {
            line,
            kind,
            partial,
        }
    }

    /// Entries aggregated before the malformed line.
    pub fn partial(&self) -> &EnvMap {
        &self.partial
    }

    pub fn into_partial(self) -> EnvMap {
        self.partial
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("empty line")]
    EmptyLine,

    #[error("can't separate key from value")]
    MissingSeparator,

    #[error("missing key")]
    MissingKey,
}

/// A value that no dotenv line can reproduce exactly.
///
/// Some mixes of `#` and quote characters are always cut short by the
/// comment stripper, whichever quoting is used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value of {key} cannot be written as a dotenv line")]
pub struct RenderError {
    pub key: String,
}
