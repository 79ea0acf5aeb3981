//! Line-oriented streaming lexer for Jack source.
//!
//! Carries two booleans across line boundaries: `in_block_comment` and
//! `in_string`. A string literal must close on the line it opens; a block
//! comment may span any number of lines.

use crate::error::{ErrorKind, JackError};
use crate::token::{self, Token, TokenKind};

pub struct Tokenizer {
    file_name: String,
    in_block_comment: bool,
    in_string: bool,
}

impl Tokenizer {
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            in_block_comment: false,
            in_string: false,
        }
    }

    /// Tokenizes an entire file's worth of lines.
    ///
    /// # Errors
    /// Returns [`JackError`] on the first lexical violation, or if a block
    /// comment or string constant is still open at end of input.
    pub fn tokenize(&mut self, lines: &[String]) -> Result<Vec<Token>, JackError> {
        let mut tokens = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            self.tokenize_line(line, idx + 1, &mut tokens)?;
        }
        if self.in_block_comment {
            return Err(JackError::new(
                &self.file_name,
                lines.len(),
                ErrorKind::UnterminatedComment,
            ));
        }
        Ok(tokens)
    }

    fn tokenize_line(
        &mut self,
        line: &str,
        line_number: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<(), JackError> {
        let chars: Vec<char> = line.chars().collect();
        let mut pending = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if self.in_string {
                if c == '"' {
                    tokens.push(Token::new(TokenKind::StringConstant, pending.clone(), line_number));
                    pending.clear();
                    self.in_string = false;
                } else {
                    pending.push(c);
                }
                i += 1;
                continue;
            }

            if self.in_block_comment {
                if c == '/' && chars.get(i + 1) == Some(&'*') {
                    return Err(JackError::new(&self.file_name, line_number, ErrorKind::NestedComment));
                }
                if c == '*' && chars.get(i + 1) == Some(&'/') {
                    self.in_block_comment = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            if c == '*' && chars.get(i + 1) == Some(&'/') {
                return Err(JackError::new(
                    &self.file_name,
                    line_number,
                    ErrorKind::UnterminatedComment,
                ));
            }

            if c == '/' && chars.get(i + 1) == Some(&'/') {
                break;
            }

            if c == '/' && chars.get(i + 1) == Some(&'*') {
                self.flush_pending(&mut pending, line_number, tokens)?;
                self.in_block_comment = true;
                i += 2;
                continue;
            }

            if c == '"' {
                self.flush_pending(&mut pending, line_number, tokens)?;
                self.in_string = true;
                i += 1;
                continue;
            }

            if c.is_whitespace() {
                self.flush_pending(&mut pending, line_number, tokens)?;
                i += 1;
                continue;
            }

            if token::is_symbol(c) {
                self.flush_pending(&mut pending, line_number, tokens)?;
                tokens.push(Token::new(TokenKind::Symbol, token::escape_symbol(c), line_number));
                i += 1;
                continue;
            }

            pending.push(c);
            i += 1;
        }

        if self.in_string {
            return Err(JackError::new(
                &self.file_name,
                line_number,
                ErrorKind::UnterminatedString,
            ));
        }
        self.flush_pending(&mut pending, line_number, tokens)
    }

    fn flush_pending(
        &self,
        pending: &mut String,
        line_number: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<(), JackError> {
        if pending.is_empty() {
            return Ok(());
        }
        let lexeme = std::mem::take(pending);
        let starts_with_digit = lexeme.chars().next().is_some_and(|c| c.is_ascii_digit());

        if token::is_keyword(&lexeme) {
            tokens.push(Token::new(TokenKind::Keyword, lexeme, line_number));
        } else if let Ok(value) = lexeme.parse::<u64>() {
            if value > u64::from(token::MAX_INTEGER) {
                return Err(JackError::new(
                    &self.file_name,
                    line_number,
                    ErrorKind::IntegerOverflow(lexeme),
                ));
            }
            tokens.push(Token::new(TokenKind::IntegerConstant, lexeme, line_number));
        } else if starts_with_digit {
            return Err(JackError::new(
                &self.file_name,
                line_number,
                ErrorKind::InvalidToken(lexeme),
            ));
        } else {
            tokens.push(Token::new(TokenKind::Identifier, lexeme, line_number));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_tokenizer_identity() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let tokens = tokenizer.tokenize(&lines(&["let x = 5;"])).unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["let", "x", "=", "5", ";"]);
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Symbol);
        assert_eq!(tokens[3].kind, TokenKind::IntegerConstant);
    }

    #[test]
    fn test_angle_and_amp_symbols_are_escaped() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let tokens = tokenizer.tokenize(&lines(&["a < b & c > d"])).unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["a", "&lt;", "b", "&amp;", "c", "&gt;", "d"]);
    }

    #[test]
    fn test_line_comment_stripped() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let tokens = tokenizer
            .tokenize(&lines(&["let x = 1; // trailing comment"]))
            .unwrap();
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let tokens = tokenizer
            .tokenize(&lines(&["let x /* this", "spans lines */ = 1;"]))
            .unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["let", "x", "=", "1", ";"]);
    }

    #[test]
    fn test_string_constant_does_not_span_lines() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let tokens = tokenizer.tokenize(&lines(&["let s = \"hello world\";"])).unwrap();
        assert_eq!(tokens[3].kind, TokenKind::StringConstant);
        assert_eq!(tokens[3].lexeme, "hello world");
    }

    #[test]
    fn test_nested_block_comment_rejected() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let err = tokenizer
            .tokenize(&lines(&["/* outer /* inner */"]))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NestedComment));
    }

    #[test]
    fn test_comment_end_without_start_rejected() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let err = tokenizer.tokenize(&lines(&["x */ y"])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnterminatedComment));
    }

    #[test]
    fn test_integer_overflow_rejected() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let err = tokenizer.tokenize(&lines(&["let x = 32768;"])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IntegerOverflow(_)));
    }

    #[test]
    fn test_identifier_cannot_start_with_digit() {
        let mut tokenizer = Tokenizer::new("Test.jack");
        let err = tokenizer.tokenize(&lines(&["let 1foo = 2;"])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidToken(_)));
    }
}
