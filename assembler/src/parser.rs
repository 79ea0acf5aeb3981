//! Parser module for Hack assembly language
//!
//! Strips comments and *all* whitespace (not just line ends — the Hack assembly
//! grammar has no whitespace-sensitive tokens, so every space and tab is
//! discarded before classification) and classifies each remaining line as an
//! A-, C-, or L-instruction.

use std::fmt;

#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // Command suffix is intentional and clear
pub enum CommandType {
    /// @Xxx where Xxx is either a symbol or a decimal number
    ACommand,
    /// dest=comp;jump
    CCommand,
    /// (Xxx) where Xxx is a symbol
    LCommand,
}

#[derive(Debug)]
pub enum ParserError {
    InvalidState(&'static str),
}

impl std::error::Error for ParserError {}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
        }
    }
}

/// Parser for assembly lines
///
/// Each line is purified (comments and whitespace stripped) into an owned
/// buffer, since removing interior whitespace can't be expressed as a
/// contiguous sub-slice of the original line.
pub struct ParserLines<'a> {
    lines: std::iter::Enumerate<std::slice::Iter<'a, String>>,
    current_line: String,
    current_line_number: usize,
    current_command_type: Option<CommandType>,
}

impl<'a> ParserLines<'a> {
    /// Creates a new parser from a slice of lines
    #[inline]
    #[must_use]
    pub fn from_lines(lines: &'a [String]) -> Self {
        Self {
            lines: lines.iter().enumerate(),
            current_line: String::new(),
            current_line_number: 0,
            current_command_type: None,
        }
    }

    /// Advances to the next valid command, skipping comments and whitespace
    #[inline]
    pub fn advance(&mut self) -> bool {
        for (idx, line) in self.lines.by_ref() {
            let purified = Self::purify(line);
            if purified.is_empty() {
                continue;
            }

            self.current_line_number = idx + 1;
            self.current_command_type = Some(Self::classify_command(&purified));
            self.current_line = purified;
            return true;
        }

        self.current_command_type = None;
        false
    }

    /// 1-based source line number of the command currently parsed
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.current_line_number
    }

    /// Strips a trailing `//` comment, then every whitespace character
    #[inline]
    fn purify(line: &str) -> String {
        let without_comment = match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        };
        without_comment.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Classifies command type based on first character
    #[inline]
    fn classify_command(line: &str) -> CommandType {
        match line.as_bytes()[0] {
            b'@' => CommandType::ACommand,
            b'(' => CommandType::LCommand,
            _ => CommandType::CCommand,
        }
    }

    /// Returns the current command type
    #[inline]
    pub fn command_type(&self) -> Result<CommandType, ParserError> {
        self.current_command_type
            .ok_or(ParserError::InvalidState("No current line available"))
    }

    /// Returns the symbol from A-command or L-command
    ///
    /// # Errors
    /// Returns error if called on C-command or if no command is available
    #[inline]
    pub fn symbol(&self) -> Result<&str, ParserError> {
        match self.current_command_type {
            Some(CommandType::ACommand) => Ok(&self.current_line[1..]),
            Some(CommandType::LCommand) => {
                let len = self.current_line.len();
                Ok(&self.current_line[1..len - 1])
            }
            Some(CommandType::CCommand) => {
                Err(ParserError::InvalidState("Called symbol() on C-command"))
            }
            None => Err(ParserError::InvalidState("No current line available")),
        }
    }

    /// Returns the dest part of a C-command
    ///
    /// Returns empty string if no dest part exists
    #[inline]
    pub fn dest(&self) -> Result<Option<&str>, ParserError> {
        match self.current_command_type {
            Some(CommandType::CCommand) => match self.current_line.find('=') {
                Some(pos) => Ok(Some(&self.current_line[..pos])),
                None => Ok(Some("")),
            },
            Some(_) => Ok(None),
            None => Err(ParserError::InvalidState("No current line available")),
        }
    }

    /// Returns the comp part of a C-command
    #[inline]
    pub fn comp(&self) -> Result<Option<&str>, ParserError> {
        match self.current_command_type {
            Some(CommandType::CCommand) => {
                let start = self.current_line.find('=').map_or(0, |pos| pos + 1);
                let end = self
                    .current_line
                    .find(';')
                    .unwrap_or(self.current_line.len());
                Ok(Some(&self.current_line[start..end]))
            }
            Some(_) => Ok(None),
            None => Err(ParserError::InvalidState("No current line available")),
        }
    }

    /// Returns the jump part of a C-command
    ///
    /// Returns empty string if no jump part exists
    #[inline]
    pub fn jump(&self) -> Result<Option<&str>, ParserError> {
        match self.current_command_type {
            Some(CommandType::CCommand) => match self.current_line.find(';') {
                Some(pos) => Ok(Some(&self.current_line[pos + 1..])),
                None => Ok(Some("")),
            },
            Some(_) => Ok(None),
            None => Err(ParserError::InvalidState("No current line available")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_classification() {
        assert_eq!(ParserLines::classify_command("@100"), CommandType::ACommand);
        assert_eq!(
            ParserLines::classify_command("(LOOP)"),
            CommandType::LCommand
        );
        assert_eq!(ParserLines::classify_command("D=M"), CommandType::CCommand);
    }

    #[test]
    fn test_purify_strips_comment_and_interior_whitespace() {
        assert_eq!(ParserLines::purify("@100 // comment"), "@100");
        assert_eq!(ParserLines::purify("D = M ; JGT"), "D=M;JGT");
        assert_eq!(ParserLines::purify("// only comment"), "");
    }

    #[test]
    fn test_parser_advance() {
        let lines = vec![
            "// comment".to_string(),
            String::new(),
            "@100".to_string(),
            "D=M // inline comment".to_string(),
        ];
        let mut parser = ParserLines::from_lines(&lines);

        assert!(parser.advance());
        assert_eq!(parser.command_type().unwrap(), CommandType::ACommand);
        assert_eq!(parser.symbol().unwrap(), "100");
        assert_eq!(parser.line_number(), 3);

        assert!(parser.advance());
        assert_eq!(parser.command_type().unwrap(), CommandType::CCommand);
        assert_eq!(parser.dest().unwrap(), Some("D"));
        assert_eq!(parser.comp().unwrap(), Some("M"));
        assert_eq!(parser.line_number(), 4);

        assert!(!parser.advance());
    }

    #[test]
    fn test_c_command_parsing() {
        let lines = vec!["MD=D+1;JMP".to_string()];
        let mut parser = ParserLines::from_lines(&lines);
        parser.advance();

        assert_eq!(parser.dest().unwrap(), Some("MD"));
        assert_eq!(parser.comp().unwrap(), Some("D+1"));
        assert_eq!(parser.jump().unwrap(), Some("JMP"));
    }

    #[test]
    fn test_c_command_no_dest() {
        let lines = vec!["D+1;JMP".to_string()];
        let mut parser = ParserLines::from_lines(&lines);
        parser.advance();

        assert_eq!(parser.dest().unwrap(), Some(""));
        assert_eq!(parser.comp().unwrap(), Some("D+1"));
        assert_eq!(parser.jump().unwrap(), Some("JMP"));
    }

    #[test]
    fn test_c_command_no_jump() {
        let lines = vec!["D=D+1".to_string()];
        let mut parser = ParserLines::from_lines(&lines);
        parser.advance();

        assert_eq!(parser.dest().unwrap(), Some("D"));
        assert_eq!(parser.comp().unwrap(), Some("D+1"));
        assert_eq!(parser.jump().unwrap(), Some(""));
    }

    #[test]
    fn test_l_command_parsing() {
        let lines = vec!["(LOOP)".to_string()];
        let mut parser = ParserLines::from_lines(&lines);
        parser.advance();

        assert_eq!(parser.command_type().unwrap(), CommandType::LCommand);
        assert_eq!(parser.symbol().unwrap(), "LOOP");
    }

    #[test]
    fn test_whitespace_handling() {
        let lines = vec!["   @100   ".to_string(), "  D=M  // comment  ".to_string()];
        let mut parser = ParserLines::from_lines(&lines);

        assert!(parser.advance());
        assert_eq!(parser.symbol().unwrap(), "100");

        assert!(parser.advance());
        assert_eq!(parser.dest().unwrap(), Some("D"));
    }
}
