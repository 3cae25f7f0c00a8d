//! Error types for ewpedit

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    /// True for spans created without a source location
    pub const fn is_empty(&self) -> bool {
        self.start.line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "document level")
        } else {
            write!(f, "{}", self.start)
        }
    }
}

/// What went wrong while reading a project document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedEof,
    Expected { expected: String, found: String },
    MismatchedTag { expected: String, found: String },
    DuplicateAttribute { name: String },
    InvalidEntity { entity: String },
    UnknownEncoding { label: String },
    UnsupportedEncoding { label: String },
    InvalidEncoding { encoding: String },
    NotAProject { found: String },
    MissingName { element: String },
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidEntity { entity } => write!(f, "invalid xml entity: &{entity};"),
            Self::UnknownEncoding { label } => write!(f, "unknown encoding: {label}"),
            Self::UnsupportedEncoding { label } => write!(f, "unsupported encoding: {label}"),
            Self::InvalidEncoding { encoding } => {
                write!(f, "input is not valid {encoding}")
            }
            Self::NotAProject { found } => {
                write!(f, "root element is <{found}>, expected <project>")
            }
            Self::MissingName { element } => write!(f, "<{element}> has no <name> child"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
        }
    }
}

/// The input is not a well-formed, recognizable project document
#[derive(Error, Clone, Debug, PartialEq)]
#[error("parse error at {span}: {message}")]
pub struct ParseError {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl ParseError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The in-memory project cannot be rendered back to a document
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SerializeError {
    #[error("invalid xml name: {name:?}")]
    InvalidName { name: String },

    #[error("character {ch:?} is not allowed in xml {context}")]
    InvalidCharacter { ch: char, context: &'static str },

    #[error("character {ch:?} cannot be represented in {encoding}")]
    Unencodable { ch: char, encoding: &'static str },

    #[error("unknown encoding: {label}")]
    UnknownEncoding { label: String },

    #[error("unsupported encoding: {label}")]
    UnsupportedEncoding { label: String },
}

/// Any failure of a complete edit pass
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// Result type alias for ewpedit
pub type Result<T, E = Error> = std::result::Result<T, E>;
