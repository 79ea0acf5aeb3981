//! Error type for the Hack assembler
//!
//! All failures are reported with the source file name and line number,
//! matching the platform-wide diagnostic convention `File {name}, line {n}: {message}`.

use std::fmt;

#[derive(Debug)]
pub enum ErrorKind {
    /// `dest`, `comp`, or `jump` mnemonic not in the fixed encoding tables.
    InvalidMnemonic { field: &'static str, mnemonic: String },
    /// A label was bound twice during pass 1.
    DuplicateLabel(String),
    /// Line didn't parse as an A-, C-, or L-instruction.
    Malformed(String),
    Io(std::io::Error),
}

#[derive(Debug)]
pub struct AssemblerError {
    pub file: String,
    pub line: usize,
    pub kind: ErrorKind,
}

impl AssemblerError {
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize, kind: ErrorKind) -> Self {
        Self {
            file: file.into(),
            line,
            kind,
        }
    }
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match &self.kind {
            ErrorKind::InvalidMnemonic { field, mnemonic } => {
                format!("invalid {field} mnemonic '{mnemonic}'")
            }
            ErrorKind::DuplicateLabel(name) => format!("label '{name}' already defined"),
            ErrorKind::Malformed(line) => format!("could not parse instruction '{line}'"),
            ErrorKind::Io(e) => format!("I/O error: {e}"),
        };
        write!(f, "File {}, line {}: {}", self.file, self.line, message)
    }
}

impl std::error::Error for AssemblerError {}

impl From<std::io::Error> for AssemblerError {
    fn from(error: std::io::Error) -> Self {
        Self::new("", 0, ErrorKind::Io(error))
    }
}
