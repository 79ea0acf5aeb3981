//! Two-scope symbol table: class (`static`/`field`) and subroutine (`arg`/`local`).
//!
//! Lookup order is subroutine table first, then class table — a subroutine's
//! local variables and parameters shadow the class's fields and statics.

use std::collections::HashMap;

use crate::error::{ErrorKind, JackError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Local,
}

impl Kind {
    /// The VM segment this kind is pushed/popped through (`field` reads as `this`).
    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Kind::Static => "static",
            Kind::Field => "this",
            Kind::Arg => "argument",
            Kind::Local => "local",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    var_type: String,
    kind: Kind,
    index: u16,
}

/// Governs what happens when `define` sees a name already present in scope.
///
/// The original compiler silently keeps the first definition despite a
/// comment suggesting it should error; `FirstWins` preserves that observable
/// behavior while `Error` is available for callers that want strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedefinitionPolicy {
    #[default]
    FirstWins,
    Error,
}

#[derive(Debug)]
pub struct SymbolTable {
    file_name: String,
    class_table: HashMap<String, Entry>,
    subroutine_table: HashMap<String, Entry>,
    static_count: u16,
    field_count: u16,
    arg_count: u16,
    var_count: u16,
    policy: RedefinitionPolicy,
}

impl SymbolTable {
    #[must_use]
    pub fn new(policy: RedefinitionPolicy) -> Self {
        Self {
            file_name: String::new(),
            class_table: HashMap::new(),
            subroutine_table: HashMap::new(),
            static_count: 0,
            field_count: 0,
            arg_count: 0,
            var_count: 0,
            policy,
        }
    }

    /// Resets both tables and all counters; called once per class compilation.
    pub fn reset(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
        self.class_table.clear();
        self.subroutine_table.clear();
        self.static_count = 0;
        self.field_count = 0;
        self.arg_count = 0;
        self.var_count = 0;
    }

    /// Resets only the subroutine table; called once per subroutine. For a
    /// `method`, slot 0 is the implicit receiver, so the `arg` counter starts
    /// at 1; constructors and functions start at 0.
    pub fn reset_subroutine(&mut self, is_method: bool) {
        self.subroutine_table.clear();
        self.arg_count = u16::from(is_method);
        self.var_count = 0;
    }

    /// Registers a name in the appropriate table.
    ///
    /// # Errors
    /// Returns [`JackError`] only under [`RedefinitionPolicy::Error`] when
    /// `name` is already defined in its scope.
    pub fn define(
        &mut self,
        name: &str,
        var_type: &str,
        kind: Kind,
        line: usize,
    ) -> Result<(), JackError> {
        let (table, counter) = match kind {
            Kind::Static => (&mut self.class_table, &mut self.static_count),
            Kind::Field => (&mut self.class_table, &mut self.field_count),
            Kind::Arg => (&mut self.subroutine_table, &mut self.arg_count),
            Kind::Local => (&mut self.subroutine_table, &mut self.var_count),
        };

        if table.contains_key(name) {
            return match self.policy {
                RedefinitionPolicy::FirstWins => Ok(()),
                RedefinitionPolicy::Error => Err(JackError::new(
                    &self.file_name,
                    line,
                    ErrorKind::Redefinition(name.to_string()),
                )),
            };
        }

        let index = *counter;
        *counter += 1;
        table.insert(
            name.to_string(),
            Entry {
                var_type: var_type.to_string(),
                kind,
                index,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn var_count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.static_count,
            Kind::Field => self.field_count,
            Kind::Arg => self.arg_count,
            Kind::Local => self.var_count,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Entry> {
        self.subroutine_table
            .get(name)
            .or_else(|| self.class_table.get(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// # Errors
    /// Returns [`JackError`] if `name` is not defined in either scope.
    pub fn kind_of(&self, name: &str, line: usize) -> Result<Kind, JackError> {
        self.lookup(name)
            .map(|e| e.kind)
            .ok_or_else(|| JackError::new(&self.file_name, line, ErrorKind::UndefinedName(name.to_string())))
    }

    /// # Errors
    /// Returns [`JackError`] if `name` is not defined in either scope.
    pub fn type_of(&self, name: &str, line: usize) -> Result<&str, JackError> {
        self.lookup(name)
            .map(|e| e.var_type.as_str())
            .ok_or_else(|| JackError::new(&self.file_name, line, ErrorKind::UndefinedName(name.to_string())))
    }

    /// # Errors
    /// Returns [`JackError`] if `name` is not defined in either scope.
    pub fn index_of(&self, name: &str, line: usize) -> Result<u16, JackError> {
        self.lookup(name)
            .map(|e| e.index)
            .ok_or_else(|| JackError::new(&self.file_name, line, ErrorKind::UndefinedName(name.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_and_field_index_independently() {
        let mut st = SymbolTable::new(RedefinitionPolicy::FirstWins);
        st.reset("Test.jack");
        st.define("x", "int", Kind::Static, 1).unwrap();
        st.define("y", "int", Kind::Field, 1).unwrap();
        st.define("z", "int", Kind::Field, 1).unwrap();
        assert_eq!(st.var_count(Kind::Static), 1);
        assert_eq!(st.var_count(Kind::Field), 2);
        assert_eq!(st.index_of("z", 1).unwrap(), 1);
    }

    #[test]
    fn test_method_arg_counter_starts_at_one() {
        let mut st = SymbolTable::new(RedefinitionPolicy::FirstWins);
        st.reset("Test.jack");
        st.reset_subroutine(true);
        st.define("a", "int", Kind::Arg, 1).unwrap();
        assert_eq!(st.index_of("a", 1).unwrap(), 1);
        assert_eq!(st.var_count(Kind::Arg), 2);
    }

    #[test]
    fn test_function_arg_counter_starts_at_zero() {
        let mut st = SymbolTable::new(RedefinitionPolicy::FirstWins);
        st.reset("Test.jack");
        st.reset_subroutine(false);
        st.define("a", "int", Kind::Arg, 1).unwrap();
        assert_eq!(st.index_of("a", 1).unwrap(), 0);
    }

    #[test]
    fn test_subroutine_scope_shadows_class_scope() {
        let mut st = SymbolTable::new(RedefinitionPolicy::FirstWins);
        st.reset("Test.jack");
        st.define("x", "int", Kind::Field, 1).unwrap();
        st.reset_subroutine(false);
        st.define("x", "boolean", Kind::Local, 1).unwrap();
        assert_eq!(st.kind_of("x", 1).unwrap(), Kind::Local);
        assert_eq!(st.type_of("x", 1).unwrap(), "boolean");
    }

    #[test]
    fn test_first_wins_by_default() {
        let mut st = SymbolTable::new(RedefinitionPolicy::FirstWins);
        st.reset("Test.jack");
        st.define("x", "int", Kind::Local, 1).unwrap();
        st.define("x", "boolean", Kind::Local, 2).unwrap();
        assert_eq!(st.type_of("x", 1).unwrap(), "int");
        assert_eq!(st.var_count(Kind::Local), 1);
    }

    #[test]
    fn test_error_policy_rejects_redefinition() {
        let mut st = SymbolTable::new(RedefinitionPolicy::Error);
        st.reset("Test.jack");
        st.define("x", "int", Kind::Local, 1).unwrap();
        let err = st.define("x", "int", Kind::Local, 2).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Redefinition(_)));
    }

    #[test]
    fn test_undefined_name_is_an_error() {
        let st = SymbolTable::new(RedefinitionPolicy::FirstWins);
        assert!(st.kind_of("nope", 1).is_err());
    }

    #[test]
    fn test_field_segment_is_this() {
        assert_eq!(Kind::Field.segment(), "this");
        assert_eq!(Kind::Static.segment(), "static");
        assert_eq!(Kind::Arg.segment(), "argument");
        assert_eq!(Kind::Local.segment(), "local");
    }
}
