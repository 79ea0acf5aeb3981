//! Error type for the Jack tokenizer, symbol table, and compiler.
//!
//! All failures are reported with the source file name and line number,
//! matching the platform-wide diagnostic convention `File {name}, line {n}: {message}`.

use std::fmt;

#[derive(Debug)]
pub enum ErrorKind {
    /// A `/*` was seen while already inside a block comment.
    NestedComment,
    /// End of file reached while still inside a block comment.
    UnterminatedComment,
    /// A string literal was still open at end of line.
    UnterminatedString,
    /// Integer literal exceeded 32767.
    IntegerOverflow(String),
    /// A lexeme was neither a keyword, an integer, nor a valid identifier.
    InvalidToken(String),
    /// Parser expected one construct and found another.
    UnexpectedToken { expected: String, found: String },
    /// Ran out of tokens mid-construct.
    UnexpectedEof(String),
    /// Reference to a name with no matching symbol-table entry.
    UndefinedName(String),
    /// A qualifier of a subroutine call resolved to a primitive-typed variable.
    MethodCallOnPrimitive(String),
    /// Indexing a variable whose declared type isn't `Array`.
    NotAnArray(String),
    /// `RedefinitionPolicy::Error` rejected a duplicate symbol definition.
    Redefinition(String),
    Io(std::io::Error),
}

#[derive(Debug)]
pub struct JackError {
    pub file: String,
    pub line: usize,
    pub kind: ErrorKind,
}

impl JackError {
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize, kind: ErrorKind) -> Self {
        Self {
            file: file.into(),
            line,
            kind,
        }
    }
}

impl fmt::Display for JackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match &self.kind {
            ErrorKind::NestedComment => "a comment inside another comment".to_string(),
            ErrorKind::UnterminatedComment => {
                "end of a comment without a beginning".to_string()
            }
            ErrorKind::UnterminatedString => "string constant not closed on its line".to_string(),
            ErrorKind::IntegerOverflow(lexeme) => {
                format!("integer '{lexeme}' exceeds 32767")
            }
            ErrorKind::InvalidToken(lexeme) => {
                format!("invalid syntax at '{lexeme}'")
            }
            ErrorKind::UnexpectedToken { expected, found } => {
                format!("expected {expected}, found '{found}'")
            }
            ErrorKind::UnexpectedEof(expected) => {
                format!("expected {expected}, found end of input")
            }
            ErrorKind::UndefinedName(name) => format!("variable '{name}' not found"),
            ErrorKind::MethodCallOnPrimitive(name) => {
                format!("built-in type variable '{name}' has no methods")
            }
            ErrorKind::NotAnArray(name) => format!("indexing non-Array variable '{name}'"),
            ErrorKind::Redefinition(name) => format!("'{name}' already declared"),
            ErrorKind::Io(e) => format!("I/O error: {e}"),
        };
        write!(f, "File {}, line {}: {}", self.file, self.line, message)
    }
}

impl std::error::Error for JackError {}

impl From<std::io::Error> for JackError {
    fn from(error: std::io::Error) -> Self {
        Self::new("", 0, ErrorKind::Io(error))
    }
}
