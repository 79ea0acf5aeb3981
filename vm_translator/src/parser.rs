//! Parser module for the VM translator's stack-machine language
//!
//! Strips comments and outer whitespace, splits each remaining line into
//! whitespace-separated tokens, and classifies it into one of the nine
//! command kinds.

use crate::error::{ErrorKind, VmError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

pub struct Parser {
    lines: Vec<(usize, String)>,
    cursor: usize,
    current_command: String,
    current_line_number: usize,
    cached_parts: Vec<String>,
}

impl Parser {
    /// Builds a parser over already-loaded source lines (comments/whitespace not yet stripped).
    #[must_use]
    pub fn from_lines(raw_lines: &[String]) -> Self {
        let lines = raw_lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let purified = Self::purify(line);
                if purified.is_empty() {
                    None
                } else {
                    Some((idx + 1, purified))
                }
            })
            .collect();

        Self {
            lines,
            cursor: 0,
            current_command: String::new(),
            current_line_number: 0,
            cached_parts: Vec::new(),
        }
    }

    fn purify(line: &str) -> String {
        let without_comment = match line.find("//") {
            Some(pos) => &line[..pos],
            None => line,
        };
        without_comment.trim().to_string()
    }

    #[inline]
    #[must_use]
    pub fn has_more_commands(&self) -> bool {
        self.cursor < self.lines.len()
    }

    #[inline]
    pub fn advance(&mut self) {
        let (line_number, command) = self.lines[self.cursor].clone();
        self.current_line_number = line_number;
        self.current_command = command;
        self.cached_parts.clear();
        self.cached_parts
            .extend(self.current_command.split_whitespace().map(str::to_string));
        self.cursor += 1;
    }

    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.current_line_number
    }

    #[inline]
    #[must_use]
    pub fn command_type(&self) -> CommandType {
        debug_assert!(!self.cached_parts.is_empty(), "empty command");
        match self.cached_parts[0].as_str() {
            "push" => CommandType::Push,
            "pop" => CommandType::Pop,
            "label" => CommandType::Label,
            "goto" => CommandType::Goto,
            "if-goto" => CommandType::If,
            "function" => CommandType::Function,
            "return" => CommandType::Return,
            "call" => CommandType::Call,
            _ => CommandType::Arithmetic,
        }
    }

    /// First argument: the arithmetic mnemonic, or the segment/label/function name.
    ///
    /// # Panics
    /// Panics if called for `Return` (which takes no arguments) — an internal
    /// misuse, not a user-facing parse failure.
    #[inline]
    pub fn arg1(&self) -> &str {
        match self.command_type() {
            CommandType::Arithmetic => &self.cached_parts[0],
            CommandType::Return => panic!("arg1 should not be called for Return"),
            _ => &self.cached_parts[1],
        }
    }

    /// Second argument: the segment index or variable/argument count.
    ///
    /// # Errors
    /// Returns [`VmError`] if the token isn't a valid integer.
    #[inline]
    pub fn arg2(&self, file_name: &str) -> Result<i64, VmError> {
        let token = &self.cached_parts[2];
        token.parse::<i64>().map_err(|_| {
            VmError::new(
                file_name,
                self.current_line_number,
                ErrorKind::Malformed(self.current_command.clone()),
            )
        })
    }
}
