//! Compile-time and run-time errors.
use std::fmt;

use thiserror::Error;

use crate::traits::TypeTag;

/// Coarse classification shared by both error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed template definition.
    Syntax,
    /// A type name that does not resolve.
    Reference,
    /// A value that does not match its template.
    Type,
}

/// Dotted location of a value or definition, `(root)` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPath(pub Vec<String>);

impl ContextPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.0.iter().any(|s| s == segment)
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

/// Failure to compile a template definition or to edit a namespace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{path}: {message}")]
    Syntax { path: ContextPath, message: String },

    #[error("{path}: undefined type '{name}'")]
    UndefinedType { path: ContextPath, name: String },

    #[error("bad alias '{alias}': type '{name}' is undefined")]
    BadAlias { alias: String, name: String },

    #[error("import error: undefined type '{name}'")]
    BadImport { name: String },
}

impl ParseError {
    pub(crate) fn syntax(path: &[String], message: impl Into<String>) -> Self {
        ParseError::Syntax { path: ContextPath(path.to_vec()), message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Syntax { .. } => ErrorKind::Syntax,
            ParseError::UndefinedType { .. }
            | ParseError::BadAlias { .. }
            | ParseError::BadImport { .. } => ErrorKind::Reference,
        }
    }
}

/// A value rejected by a template. Validation stops at the first one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{path}: expects {expected} but got {found}")]
    Mismatch { path: ContextPath, expected: TypeTag, found: String },

    #[error("{path}: property is required but missing")]
    Missing { path: ContextPath },

    #[error("{path}: property is not nullable")]
    NotNullable { path: ContextPath },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Type
    }

    pub fn path(&self) -> &ContextPath {
        match self {
            ValidationError::Mismatch { path, .. }
            | ValidationError::Missing { path }
            | ValidationError::NotNullable { path } => path,
        }
    }
}
