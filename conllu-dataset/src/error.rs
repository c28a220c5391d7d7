use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Dataset error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The dataset could not be opened, read or written.
    #[error("could not access {}: {source}", display_path(.path))]
    IO {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// The data does not conform to the CoNLL-U format.
    #[error("{}{source}", location(.path, .line))]
    Format {
        path: Option<PathBuf>,
        /// 0-based line number, for errors found while reading.
        line: Option<usize>,
        #[source]
        source: ParseError,
    },
}

impl Error {
    /// Returns `true` if this is an I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::IO { .. })
    }

    /// Returns `true` if this is a format error.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    /// Get the path of the file in which the error occurred, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::IO { path, .. } | Error::Format { path, .. } => path.as_deref(),
        }
    }

    /// Get the 0-based line number at which a read error occurred.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::IO { .. } => None,
            Error::Format { line, .. } => *line,
        }
    }

    /// Get the underlying format error, if any.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::IO { .. } => None,
            Error::Format { source, .. } => Some(source),
        }
    }

    /// Attach a path to an error that does not have one yet.
    pub(crate) fn with_path(mut self, new_path: &Path) -> Self {
        match &mut self {
            Error::IO { path, .. } | Error::Format { path, .. } => {
                if path.is_none() {
                    *path = Some(new_path.to_owned());
                }
            }
        }

        self
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::IO { path: None, source }
    }
}

impl From<ParseError> for Error {
    fn from(source: ParseError) -> Self {
        Error::Format {
            path: None,
            line: None,
            source,
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "treebank".to_owned(),
    }
}

fn location(path: &Option<PathBuf>, line: &Option<usize>) -> String {
    match (path, line) {
        (Some(path), Some(line)) => format!("{}:{}: ", path.display(), line),
        (Some(path), None) => format!("{}: ", path.display()),
        (None, Some(line)) => format!("line {}: ", line),
        (None, None) => String::new(),
    }
}

/// CoNLL-U format errors.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// A line does not consist of ten tab-separated fields.
    #[error("expected 10 tab-separated fields, found {count}")]
    FieldCount { count: usize },

    /// A field is the empty string.
    #[error("{field} field is empty")]
    EmptyField { field: &'static str },

    /// A field contains a tab or line break, or starts or ends with
    /// whitespace, and cannot be read back from a CoNLL-U line.
    #[error("{field} field cannot be written as a CoNLL-U field: {value:?}")]
    IllegalCharacter { field: &'static str, value: String },

    /// The identifier field could not be parsed.
    #[error("cannot parse as identifier field: {value:?}")]
    ParseIdentifierField { value: String },

    /// An integer field could not be parsed as an integer.
    #[error("cannot parse as integer field: {value:?}")]
    ParseIntField { value: String },

    /// The universal part-of-speech tag is not in the vocabulary.
    #[error("unknown universal part-of-speech tag: {value:?}")]
    UnknownUpos { value: String },

    /// The dependency relation is not in the vocabulary.
    #[error("unknown dependency relation: {value:?}")]
    UnknownDeprel { value: String },

    /// The feature name is not in the vocabulary.
    #[error("unknown feature: {value:?}")]
    UnknownFeature { value: String },

    /// The feature field could not be parsed.
    #[error("cannot parse feature field: {value:?}")]
    IncorrectFeatureField { value: String },

    /// A line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    Encoding,

    /// A sentence without words cannot be written, since it would be read
    /// back as a sentence separator.
    #[error("sentence does not contain any words")]
    EmptySentence,

    /// A graph cannot be written as a sentence.
    #[error("graph does not conform to the required shape: {reason}")]
    MalformedGraph { reason: String },
}

/// Configuration errors.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown UD version: {0}")]
    UnknownUdVersion(u8),

    #[error("unknown node label type: {0:?}")]
    UnknownNodeLabels(String),
}
