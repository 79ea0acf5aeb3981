//! Jack compiler for the `Nand2Tetris` course.
//!
//! Lexes and compiles Jack source files (one class per file) directly to VM
//! command text; there is no intermediate parse tree and no XML emission.
//!
//! # Architecture
//!
//! - [`token`]: the `(kind, lexeme, line)` token model and the fixed keyword/symbol sets
//! - [`tokenizer`]: line-oriented streaming lexer with cross-line comment/string state
//! - [`cursor`]: immutable two-token-lookahead view over a token slice
//! - [`symbol_table`]: two-scope (class/subroutine) name resolution
//! - [`vm_writer`]: one-command-per-call VM text emitter
//! - [`compiler`]: the recursive-descent grammar, wired to the above
//! - [`error`]: file+line diagnostics shared across the whole crate
//!
//! [`compile_file`] drives one source file end to end: tokenize, then compile
//! the single class it must contain.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod compiler;
pub mod cursor;
pub mod error;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;
pub mod vm_writer;

pub use compiler::Compiler;
pub use error::{ErrorKind, JackError};
pub use symbol_table::RedefinitionPolicy;
use tokenizer::Tokenizer;

/// Tokenizes and compiles one `.jack` file's lines into VM command text.
///
/// `file_name` is used only for diagnostics (it need not be a real path).
///
/// # Errors
/// Returns [`JackError`] on the first lexical, syntactic, or semantic
/// violation encountered.
pub fn compile_file(
    file_name: &str,
    lines: &[String],
    policy: RedefinitionPolicy,
) -> Result<String, JackError> {
    let tokens = Tokenizer::new(file_name).tokenize(lines)?;
    Compiler::new(policy).compile_class(file_name, &tokens)
}
