//! Single-pass recursive-descent compiler: token stream -> VM text.
//!
//! One [`Compiler`] is reused across an entire run (it only owns the
//! redefinition policy); each call to [`Compiler::compile_class`] spawns a
//! fresh [`ClassState`] so the symbol tables, class name, and label counter
//! reset exactly at the class boundary spec.md requires, never leaking
//! between files.

use crate::cursor::Cursor;
use crate::error::{ErrorKind, JackError};
use crate::symbol_table::{Kind, RedefinitionPolicy, SymbolTable};
use crate::token::{Token, TokenKind};
use crate::vm_writer::{is_binary_operator, VmWriter};

const TYPE_KEYWORDS: &[&str] = &["int", "char", "boolean"];
const SUBROUTINE_KINDS: &[&str] = &["constructor", "function", "method"];
const CLASS_VAR_KINDS: &[&str] = &["static", "field"];
const STATEMENT_KEYWORDS: &[&str] = &["let", "if", "while", "do", "return"];
const KEYWORD_CONSTANTS: &[&str] = &["true", "false", "null", "this"];
const UNARY_OPS: &[&str] = &["-", "~"];
/// Lexemes that legally follow a bare variable-read term: a binary operator
/// or one of the four constructs that can immediately close an expression.
const TERM_FOLLOW_SET: &[&str] = &[";", ")", "]", ","];

pub struct Compiler {
    policy: RedefinitionPolicy,
}

impl Compiler {
    #[must_use]
    pub fn new(policy: RedefinitionPolicy) -> Self {
        Self { policy }
    }

    /// Compiles one class's worth of tokens into VM command text.
    ///
    /// # Errors
    /// Returns [`JackError`] on the first syntactic or semantic violation.
    pub fn compile_class(&self, file_name: &str, tokens: &[Token]) -> Result<String, JackError> {
        let mut state = ClassState::new(file_name, self.policy);
        let mut cursor = Cursor::new(tokens);

        let first = cursor.advance().ok_or_else(|| state.err_eof("a class declaration"))?;
        if !first.is("class") {
            return Err(state.err(
                first.line,
                ErrorKind::UnexpectedToken {
                    expected: "a class declaration".to_string(),
                    found: first.lexeme.clone(),
                },
            ));
        }
        state.compile_class_body(&mut cursor)?;
        Ok(state.writer.finish())
    }
}

/// Per-class compilation state: symbol tables, emitted VM text, and the two
/// counters (`label_count` for if/while, the implicit class name) that must
/// not survive past one class.
struct ClassState {
    file_name: String,
    class_name: String,
    label_count: u32,
    symbols: SymbolTable,
    writer: VmWriter,
}

impl ClassState {
    fn new(file_name: &str, policy: RedefinitionPolicy) -> Self {
        Self {
            file_name: file_name.to_string(),
            class_name: String::new(),
            label_count: 0,
            symbols: SymbolTable::new(policy),
            writer: VmWriter::new(),
        }
    }

    fn err(&self, line: usize, kind: ErrorKind) -> JackError {
        JackError::new(&self.file_name, line, kind)
    }

    fn err_eof(&self, expected: &str) -> JackError {
        JackError::new(&self.file_name, 0, ErrorKind::UnexpectedEof(expected.to_string()))
    }

    fn next_label(&mut self) -> u32 {
        let n = self.label_count;
        self.label_count += 1;
        n
    }

    // ---------- token consumption helpers ----------

    fn advance<'a>(&self, c: &mut Cursor<'a>, expected: &str) -> Result<&'a Token, JackError> {
        c.advance().ok_or_else(|| self.err(c.last_line(), ErrorKind::UnexpectedEof(expected.to_string())))
    }

    fn expect_symbol<'a>(&self, c: &mut Cursor<'a>, symbol: &str, context: &str) -> Result<&'a Token, JackError> {
        let token = self.advance(c, context)?;
        if token.kind == TokenKind::Symbol && token.is(symbol) {
            Ok(token)
        } else {
            Err(self.err(
                token.line,
                ErrorKind::UnexpectedToken {
                    expected: context.to_string(),
                    found: token.lexeme.clone(),
                },
            ))
        }
    }

    fn expect_identifier<'a>(&self, c: &mut Cursor<'a>, context: &str) -> Result<&'a Token, JackError> {
        let token = self.advance(c, context)?;
        if token.kind == TokenKind::Identifier {
            Ok(token)
        } else {
            Err(self.err(
                token.line,
                ErrorKind::UnexpectedToken {
                    expected: context.to_string(),
                    found: token.lexeme.clone(),
                },
            ))
        }
    }

    /// A type token is either an identifier (class name) or one of the
    /// primitive type keywords; `extra` adds e.g. `"void"` for return types.
    fn expect_type<'a>(&self, c: &mut Cursor<'a>, extra: &[&str], context: &str) -> Result<&'a Token, JackError> {
        let token = self.advance(c, context)?;
        let is_primitive = TYPE_KEYWORDS.contains(&token.lexeme.as_str()) || extra.contains(&token.lexeme.as_str());
        if token.kind == TokenKind::Identifier || is_primitive {
            Ok(token)
        } else {
            Err(self.err(
                token.line,
                ErrorKind::UnexpectedToken {
                    expected: context.to_string(),
                    found: token.lexeme.clone(),
                },
            ))
        }
    }

    // ---------- class ----------

    fn compile_class_body(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        let name = self.expect_identifier(c, "invalid class name")?;
        self.class_name = name.lexeme.clone();
        self.expect_symbol(c, "{", "missing '{' after the class name")?;
        self.compile_class_var_decs(c)?;
        self.compile_subroutines(c)?;
        self.expect_symbol(c, "}", "missing '}' at the end of the class")?;
        Ok(())
    }

    fn compile_class_var_decs(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        self.symbols.reset(self.file_name.clone());
        while c.at_one_of(CLASS_VAR_KINDS) {
            let kind_tok = self.advance(c, "class variable declaration")?;
            let kind = if kind_tok.is("static") { Kind::Static } else { Kind::Field };
            let type_tok = self.expect_type(c, &[], "wrong or missing class variable type")?;
            let var_type = type_tok.lexeme.clone();

            loop {
                let name_tok = self.expect_identifier(c, "wrong or missing class variable name")?;
                let (name, line) = (name_tok.lexeme.clone(), name_tok.line);
                self.symbols.define(&name, &var_type, kind, line)?;
                if c.at(",") {
                    c.advance();
                } else {
                    break;
                }
            }
            self.expect_symbol(c, ";", "missing ';' after class variable declaration")?;
        }
        Ok(())
    }

    fn compile_subroutines(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        while c.at_one_of(SUBROUTINE_KINDS) {
            let (name, kind) = self.compile_subroutine_dec(c)?;
            self.compile_subroutine_body(c, &name, &kind)?;
        }
        Ok(())
    }

    // ---------- subroutines ----------

    /// Returns the subroutine's name and its kind (`"constructor"`,
    /// `"function"`, or `"method"`) — the body's prologue depends on which.
    fn compile_subroutine_dec(&mut self, c: &mut Cursor) -> Result<(String, String), JackError> {
        let kind_tok = self.advance(c, "subroutine declaration")?;
        let kind = kind_tok.lexeme.clone();
        self.expect_type(c, &["void"], "invalid subroutine return type")?;
        let name_tok = self.expect_identifier(c, "wrong or missing subroutine name")?;
        let name = name_tok.lexeme.clone();
        self.expect_symbol(c, "(", "missing '(' in the parameter list")?;
        self.compile_parameter_list(c, &kind)?;
        self.expect_symbol(c, ")", "missing ')' in the parameter list")?;
        Ok((name, kind))
    }

    fn compile_parameter_list(&mut self, c: &mut Cursor, subroutine_kind: &str) -> Result<(), JackError> {
        self.symbols.reset_subroutine(subroutine_kind == "method");
        while !c.at(")") {
            let type_tok = self.expect_type(c, &[], "wrong or missing parameter type")?;
            let var_type = type_tok.lexeme.clone();
            let name_tok = self.expect_identifier(c, "wrong or missing parameter name")?;
            let (name, line) = (name_tok.lexeme.clone(), name_tok.line);
            self.symbols.define(&name, &var_type, Kind::Arg, line)?;
            if c.at(",") {
                c.advance();
            }
        }
        Ok(())
    }

    fn compile_subroutine_body(&mut self, c: &mut Cursor, name: &str, kind: &str) -> Result<(), JackError> {
        self.expect_symbol(c, "{", "missing '{' after the subroutine declaration")?;
        self.compile_var_decs(c)?;

        let function_name = format!("{}.{name}", self.class_name);
        let n_locals = self.symbols.var_count(Kind::Local);
        self.writer.write_function(&function_name, n_locals);

        match kind {
            "constructor" => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.writer.write_push("constant", n_fields);
                self.writer.write_call("Memory.alloc", 1);
                self.writer.write_pop("pointer", 0);
            }
            "method" => {
                self.writer.write_push("argument", 0);
                self.writer.write_pop("pointer", 0);
            }
            _ => {}
        }
        self.compile_statements(c)?;
        self.expect_symbol(c, "}", "missing '}' at the end of subroutine")?;
        Ok(())
    }

    fn compile_var_decs(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        while c.at("var") {
            c.advance();
            let type_tok = self.expect_type(c, &[], "wrong or missing variable type")?;
            let var_type = type_tok.lexeme.clone();
            loop {
                let name_tok = self.expect_identifier(c, "wrong or missing variable name")?;
                let (name, line) = (name_tok.lexeme.clone(), name_tok.line);
                self.symbols.define(&name, &var_type, Kind::Local, line)?;
                if c.at(",") {
                    c.advance();
                } else {
                    break;
                }
            }
            self.expect_symbol(c, ";", "missing ';' after variable declaration")?;
        }
        Ok(())
    }

    // ---------- statements ----------

    fn compile_statements(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        while c.at_one_of(STATEMENT_KEYWORDS) {
            let keyword = self.advance(c, "statement")?.lexeme.clone();
            match keyword.as_str() {
                "let" => self.compile_let(c)?,
                "if" => self.compile_if(c)?,
                "while" => self.compile_while(c)?,
                "do" => self.compile_do(c)?,
                "return" => self.compile_return(c)?,
                _ => unreachable!("keyword validated by at_one_of"),
            }
        }
        Ok(())
    }

    fn compile_let(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        let name_tok = self.expect_identifier(c, "wrong or missing variable name")?;
        let (name, line) = (name_tok.lexeme.clone(), name_tok.line);
        let kind = self.symbols.kind_of(&name, line)?;
        let var_type = self.symbols.type_of(&name, line)?.to_string();
        let index = self.symbols.index_of(&name, line)?;
        let segment = kind.segment();

        if c.at("[") {
            self.compile_array_address(c, &var_type, segment, index, line)?;
            self.expect_symbol(c, "=", "missing '=' in the let statement")?;
            self.compile_expression(c)?;
            // RHS evaluation may itself reference `that`, so the computed
            // element address is staged through temp before pointer 1 is set.
            self.writer.write_pop("temp", 0);
            self.writer.write_pop("pointer", 1);
            self.writer.write_push("temp", 0);
            self.writer.write_pop("that", 0);
        } else {
            self.expect_symbol(c, "=", "missing '=' in the let statement")?;
            self.compile_expression(c)?;
            self.writer.write_pop(segment, index);
        }
        self.expect_symbol(c, ";", "missing ';' in the let statement")?;
        Ok(())
    }

    fn compile_if(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        let n = self.next_label();
        let else_label = format!("IF_ELSE{n}");
        let end_label = format!("IF_END{n}");

        self.expect_symbol(c, "(", "missing '(' in the if statement")?;
        self.compile_expression(c)?;
        self.expect_symbol(c, ")", "missing ')' in the if statement")?;
        self.expect_symbol(c, "{", "missing '{' in the if statement")?;

        self.writer.write_not();
        self.writer.write_if_goto(&else_label);
        self.compile_statements(c)?;
        self.expect_symbol(c, "}", "missing '}' in the if statement")?;
        self.writer.write_goto(&end_label);
        self.writer.write_label(&else_label);

        if c.at("else") {
            c.advance();
            self.expect_symbol(c, "{", "missing '{' in the else statement")?;
            self.compile_statements(c)?;
            self.expect_symbol(c, "}", "missing '}' in the else statement")?;
        }
        self.writer.write_label(&end_label);
        Ok(())
    }

    fn compile_while(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        let n = self.next_label();
        let top_label = format!("WHILE_EXP{n}");
        let end_label = format!("WHILE_END{n}");

        self.expect_symbol(c, "(", "missing '(' in the while statement")?;
        self.writer.write_label(&top_label);
        self.compile_expression(c)?;
        self.writer.write_not();
        self.writer.write_if_goto(&end_label);
        self.expect_symbol(c, ")", "missing ')' in the while statement")?;
        self.expect_symbol(c, "{", "missing '{' in the while statement")?;
        self.compile_statements(c)?;
        self.expect_symbol(c, "}", "missing '}' in the while statement")?;
        self.writer.write_goto(&top_label);
        self.writer.write_label(&end_label);
        Ok(())
    }

    fn compile_do(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        self.compile_subroutine_call(c)?;
        self.expect_symbol(c, ";", "missing ';' in the do statement")?;
        self.writer.write_pop("temp", 0);
        Ok(())
    }

    fn compile_return(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        if c.at(";") {
            self.writer.write_push("constant", 0);
        } else {
            self.compile_expression(c)?;
        }
        self.expect_symbol(c, ";", "missing ';' in the return statement")?;
        self.writer.write_return();
        Ok(())
    }

    // ---------- subroutine calls ----------

    fn compile_subroutine_call(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        let head = self.expect_identifier(c, "wrong or missing identifier in subroutine call")?;
        let (head_name, head_line) = (head.lexeme.clone(), head.line);

        let mut n_args = 0u16;
        let function_name = if c.at(".") {
            c.advance();
            let method = self.expect_identifier(c, "wrong or missing identifier in subroutine call")?;
            let method_name = method.lexeme.clone();

            if self.symbols.contains(&head_name) {
                let var_type = self.symbols.type_of(&head_name, head_line)?.to_string();
                if is_primitive_type(&var_type) {
                    return Err(self.err(head_line, ErrorKind::MethodCallOnPrimitive(head_name)));
                }
                let kind = self.symbols.kind_of(&head_name, head_line)?;
                let index = self.symbols.index_of(&head_name, head_line)?;
                self.writer.write_push(kind.segment(), index);
                n_args += 1;
                format!("{var_type}.{method_name}")
            } else {
                format!("{head_name}.{method_name}")
            }
        } else {
            self.writer.write_push("pointer", 0);
            n_args += 1;
            format!("{}.{head_name}", self.class_name)
        };

        self.expect_symbol(c, "(", "missing '(' in subroutine call")?;
        n_args += self.compile_expression_list(c)?;
        self.expect_symbol(c, ")", "missing ')' in subroutine call")?;
        self.writer.write_call(&function_name, n_args);
        Ok(())
    }

    fn compile_expression_list(&mut self, c: &mut Cursor) -> Result<u16, JackError> {
        let mut count = 0u16;
        while !c.at(")") {
            self.compile_expression(c)?;
            count += 1;
            if c.at(",") {
                c.advance();
            }
        }
        Ok(count)
    }

    // ---------- expressions ----------

    fn compile_expression(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        self.compile_term(c)?;
        while c.peek().is_some_and(|t| t.kind == TokenKind::Symbol && is_binary_operator(&t.lexeme)) {
            let op = self.advance(c, "operator")?.lexeme.clone();
            self.compile_term(c)?;
            self.writer.write_binary_op(&op);
        }
        Ok(())
    }

    fn compile_term(&mut self, c: &mut Cursor) -> Result<(), JackError> {
        let next = c.peek().ok_or_else(|| self.err_eof("a term"))?;

        if next.kind == TokenKind::Keyword && KEYWORD_CONSTANTS.contains(&next.lexeme.as_str()) {
            let lexeme = self.advance(c, "term")?.lexeme.clone();
            match lexeme.as_str() {
                "true" => {
                    self.writer.write_push("constant", 1);
                    self.writer.write_neg();
                }
                "false" | "null" => self.writer.write_push("constant", 0),
                "this" => self.writer.write_push("pointer", 0),
                _ => unreachable!(),
            }
            return Ok(());
        }

        if next.kind == TokenKind::IntegerConstant {
            let lexeme = self.advance(c, "term")?.lexeme.clone();
            let value: u16 = lexeme.parse().expect("tokenizer validated integer range");
            self.writer.write_push("constant", value);
            return Ok(());
        }

        if next.kind == TokenKind::StringConstant {
            let lexeme = self.advance(c, "term")?.lexeme.clone();
            self.writer.write_push("constant", u16::try_from(lexeme.len()).unwrap_or(u16::MAX));
            self.writer.write_call("String.new", 1);
            for ch in lexeme.chars() {
                self.writer.write_push("constant", u16::from(ch as u8));
                self.writer.write_call("String.appendChar", 2);
            }
            return Ok(());
        }

        if next.is("(") {
            c.advance();
            self.compile_expression(c)?;
            self.expect_symbol(c, ")", "missing ')' in the expression")?;
            return Ok(());
        }

        if next.kind == TokenKind::Symbol && UNARY_OPS.contains(&next.lexeme.as_str()) {
            let op = self.advance(c, "term")?.lexeme.clone();
            self.compile_term(c)?;
            if op == "~" {
                self.writer.write_not();
            } else {
                self.writer.write_neg();
            }
            return Ok(());
        }

        if next.kind == TokenKind::Identifier {
            let lookahead = c.peek_at(1).map(|t| t.lexeme.as_str());
            if lookahead == Some("(") || lookahead == Some(".") {
                return self.compile_subroutine_call(c);
            }
            if lookahead == Some("[") {
                let name_tok = self.advance(c, "term")?;
                let (name, line) = (name_tok.lexeme.clone(), name_tok.line);
                let kind = self.symbols.kind_of(&name, line)?;
                let var_type = self.symbols.type_of(&name, line)?.to_string();
                let index = self.symbols.index_of(&name, line)?;
                self.compile_array_address(c, &var_type, kind.segment(), index, line)?;
                self.writer.write_pop("pointer", 1);
                self.writer.write_push("that", 0);
                return Ok(());
            }
            if lookahead.is_some_and(|l| is_binary_operator(l) || TERM_FOLLOW_SET.contains(&l)) {
                let name_tok = self.advance(c, "term")?;
                let (name, line) = (name_tok.lexeme.clone(), name_tok.line);
                let kind = self.symbols.kind_of(&name, line)?;
                let index = self.symbols.index_of(&name, line)?;
                self.writer.write_push(kind.segment(), index);
                return Ok(());
            }
            return Err(self.err(next.line, ErrorKind::UnexpectedToken {
                expected: "a suitable term".to_string(),
                found: next.lexeme.clone(),
            }));
        }

        Err(self.err(next.line, ErrorKind::UnexpectedToken {
            expected: "a suitable term".to_string(),
            found: next.lexeme.clone(),
        }))
    }

    /// Computes an array element's address and leaves it on top of the
    /// stack: `push segment index; compile(expr); add`. The caller decides
    /// whether to dereference it (read) or stage it as a write target.
    fn compile_array_address(
        &mut self,
        c: &mut Cursor,
        var_type: &str,
        segment: &str,
        index: u16,
        line: usize,
    ) -> Result<(), JackError> {
        if var_type != "Array" {
            return Err(self.err(line, ErrorKind::NotAnArray(var_type.to_string())));
        }
        self.expect_symbol(c, "[", "missing '[' in array access")?;
        self.writer.write_push(segment, index);
        self.compile_expression(c)?;
        self.writer.write_binary_op("+");
        self.expect_symbol(c, "]", "missing ']'")?;
        Ok(())
    }
}

fn is_primitive_type(type_name: &str) -> bool {
    matches!(type_name, "int" | "char" | "boolean" | "void")
}
