use thiserror::Error;

/// A record's fixed key set was used incorrectly.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("{0} is not a valid key")]
    UnknownKey(String),

    #[error("{0} is not a mutable key")]
    ImmutableKey(String),

    #[error("{key} expects {expected}, got {got}")]
    WrongType {
        key: String,
        expected: &'static str,
        got: &'static str,
    },
}

/// Integrity problems found while populating the catalogue.
///
/// Validation runs over the entire store in one pass and collects every
/// problem it finds, one message per category, rather than stopping at
/// the first.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{}", .problems.join("; "))]
pub struct ValidationError {
    pub problems: Vec<String>,
}

impl ValidationError {
    pub fn new(problems: Vec<String>) -> Self {
        Self { problems }
    }
}

/// The backing store's structure does not match the expected document
/// layout. Decoding is all-or-nothing: any of these leaves previously
/// loaded state untouched.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("backing store is not well formed: {0}")]
    Syntax(String),

    #[error("expected {container} to be {expected}, got {kind}")]
    Kind {
        container: &'static str,
        expected: &'static str,
        kind: &'static str,
    },

    #[error("expected {expected} children in {container}, received {actual}")]
    ChildCount {
        container: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("expected '{expected}' but got '{actual}' for child #{index} of {container}")]
    Child {
        container: &'static str,
        index: usize,
        expected: &'static str,
        actual: String,
    },

    #[error("child #{index} of {container} is missing attribute '{attribute}'")]
    MissingAttribute {
        container: &'static str,
        index: usize,
        attribute: &'static str,
    },

    #[error("child #{index} of {container} has unexpected attribute '{attribute}'")]
    UnknownAttribute {
        container: &'static str,
        index: usize,
        attribute: String,
    },

    #[error("child #{index} of {container} has malformed {attribute} '{value}'")]
    MalformedValue {
        container: &'static str,
        index: usize,
        attribute: &'static str,
        value: String,
    },
}

/// A region conversion was asked to divide by a degenerate reference.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("reference size {width}x{height} has no area")]
    EmptyReference { width: u32, height: u32 },
}

/// Any failure while loading or saving the catalogue.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
