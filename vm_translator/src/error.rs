//! Error type for the VM translator
//!
//! Mirrors the assembler's diagnostic convention: `File {name}, line {n}: {message}`.

use std::fmt;

#[derive(Debug)]
pub enum ErrorKind {
    /// `push`/`pop` named a segment outside the fixed set of eight.
    InvalidSegment(String),
    /// `temp`/`pointer` index out of its fixed hardware range.
    IndexOutOfRange { segment: &'static str, index: i64 },
    /// Arithmetic command not one of the nine legal mnemonics.
    UnknownArithmetic(String),
    /// Line didn't parse as any recognized VM command.
    Malformed(String),
    Io(std::io::Error),
}

#[derive(Debug)]
pub struct VmError {
    pub file: String,
    pub line: usize,
    pub kind: ErrorKind,
}

impl VmError {
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize, kind: ErrorKind) -> Self {
        Self {
            file: file.into(),
            line,
            kind,
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match &self.kind {
            ErrorKind::InvalidSegment(seg) => format!("invalid segment '{seg}'"),
            ErrorKind::IndexOutOfRange { segment, index } => {
                format!("index {index} out of range for segment '{segment}'")
            }
            ErrorKind::UnknownArithmetic(op) => format!("unknown arithmetic command '{op}'"),
            ErrorKind::Malformed(line) => format!("could not parse command '{line}'"),
            ErrorKind::Io(e) => format!("I/O error: {e}"),
        };
        write!(f, "File {}, line {}: {}", self.file, self.line, message)
    }
}

impl std::error::Error for VmError {}

impl From<std::io::Error> for VmError {
    fn from(error: std::io::Error) -> Self {
        Self::new("", 0, ErrorKind::Io(error))
    }
}
