//! VM Translator for the `Nand2Tetris` course
//!
//! Translates the stack-machine VM language into Hack assembly text.
//!
//! # Architecture
//!
//! - [`parser`]: splits VM source lines into typed commands
//! - [`code_writer`]: emits the corresponding assembly for each command
//! - [`error`]: file+line diagnostics shared across a translation run
//!
//! A single [`translate`] call drives both file-mode and directory-mode
//! translation: pass one unit for file mode, several for directory mode (and
//! set `bootstrap` accordingly) — bootstrap is only ever emitted once, before
//! the first unit, exactly as the reference implementation's directory mode
//! does it.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod code_writer;
pub mod error;
pub mod parser;

use code_writer::CodeWriter;
use error::{ErrorKind, VmError};
use parser::{CommandType, Parser};

const ARITHMETIC_COMMANDS: &[&str] = &[
    "add", "sub", "neg", "eq", "gt", "lt", "and", "or", "not",
];
const SEGMENTS: &[&str] = &[
    "constant", "local", "argument", "this", "that", "temp", "pointer", "static",
];

fn validate_segment(segment: &str, file_name: &str, line: usize) -> Result<(), VmError> {
    if SEGMENTS.contains(&segment) {
        Ok(())
    } else {
        Err(VmError::new(
            file_name,
            line,
            ErrorKind::InvalidSegment(segment.to_string()),
        ))
    }
}

fn validate_index(segment: &str, index: i64, file_name: &str, line: usize) -> Result<(), VmError> {
    let in_range = match segment {
        "temp" => (0..=7).contains(&index),
        "pointer" => (0..=1).contains(&index),
        _ => index >= 0,
    };
    if in_range {
        Ok(())
    } else {
        Err(VmError::new(
            file_name,
            line,
            ErrorKind::IndexOutOfRange {
                segment: match segment {
                    "temp" => "temp",
                    "pointer" => "pointer",
                    _ => "segment",
                },
                index,
            },
        ))
    }
}

/// Translates one `.vm` file's worth of source lines, writing assembly through `writer`.
///
/// The caller is responsible for calling [`CodeWriter::set_file_stem`] first.
pub fn translate_unit<W: std::io::Write>(
    lines: &[String],
    file_name: &str,
    writer: &mut CodeWriter<W>,
) -> Result<(), VmError> {
    let mut parser = Parser::from_lines(lines);

    while parser.has_more_commands() {
        parser.advance();
        let line = parser.line_number();

        match parser.command_type() {
            CommandType::Arithmetic => {
                let op = parser.arg1();
                if !ARITHMETIC_COMMANDS.contains(&op) {
                    return Err(VmError::new(
                        file_name,
                        line,
                        ErrorKind::UnknownArithmetic(op.to_string()),
                    ));
                }
                writer.write_arithmetic(op)?;
            }
            CommandType::Push | CommandType::Pop => {
                let is_pop = parser.command_type() == CommandType::Pop;
                let segment = parser.arg1().to_string();
                let index = parser.arg2(file_name)?;
                validate_segment(&segment, file_name, line)?;
                validate_index(&segment, index, file_name, line)?;
                if is_pop && segment == "constant" {
                    return Err(VmError::new(
                        file_name,
                        line,
                        ErrorKind::InvalidSegment(segment),
                    ));
                }
                let command = if is_pop { "pop" } else { "push" };
                writer.write_push_pop(command, &segment, index)?;
            }
            CommandType::Label => writer.write_label(parser.arg1())?,
            CommandType::Goto => writer.write_goto(parser.arg1())?,
            CommandType::If => writer.write_if_goto(parser.arg1())?,
            CommandType::Function => {
                let name = parser.arg1().to_string();
                let n_locals = parser.arg2(file_name)?;
                writer.write_function(&name, n_locals)?;
            }
            CommandType::Call => {
                let name = parser.arg1().to_string();
                let n_args = parser.arg2(file_name)?;
                writer.write_call(&name, n_args)?;
            }
            CommandType::Return => writer.write_return()?,
        }
    }

    Ok(())
}

/// Translates a sequence of `(file_stem, source_lines)` units into one assembly text.
///
/// `bootstrap` should be `true` only when translating a whole directory — a
/// single `.vm` file never gets `SP = 256` / `call Sys.init 0` prepended.
pub fn translate(units: &[(String, Vec<String>)], bootstrap: bool) -> Result<String, VmError> {
    let mut writer = CodeWriter::new(Vec::new());

    if bootstrap {
        writer.write_bootstrap()?;
    }

    for (stem, lines) in units {
        writer.set_file_stem(stem);
        translate_unit(lines, &format!("{stem}.vm"), &mut writer)?;
    }

    writer.flush()?;
    let bytes = writer.into_inner();
    Ok(String::from_utf8(bytes).expect("generated assembly is always valid UTF-8"))
}
