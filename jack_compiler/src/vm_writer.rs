//! Emits VM command text for the compiler's recursive-descent rules.
//!
//! Mirrors the one-command-per-call shape of the original VM encoder: each
//! method appends exactly one line to the accumulated buffer.

use phf::phf_map;

/// Binary-operator lexeme (already XML-escaped where relevant) to the VM
/// command it lowers to. `*` and `/` lower to library calls rather than
/// arithmetic opcodes; the Hack platform has no native multiply/divide.
static BINARY_OP_COMMANDS: phf::Map<&'static str, &'static str> = phf_map! {
    "+" => "add",
    "-" => "sub",
    "&amp;" => "and",
    "|" => "or",
    "&lt;" => "lt",
    "&gt;" => "gt",
    "=" => "eq",
};

#[must_use]
pub fn is_binary_operator(lexeme: &str) -> bool {
    BINARY_OP_COMMANDS.contains_key(lexeme) || lexeme == "*" || lexeme == "/"
}

pub struct VmWriter {
    buf: String,
}

impl VmWriter {
    #[must_use]
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    pub fn write_push(&mut self, segment: &str, index: u16) {
        self.buf.push_str(&format!("push {segment} {index}\n"));
    }

    pub fn write_pop(&mut self, segment: &str, index: u16) {
        self.buf.push_str(&format!("pop {segment} {index}\n"));
    }

    /// Emits the command for a binary operator lexeme (`+`, `&amp;`, `*`, …).
    ///
    /// # Panics
    /// Panics if `op` is not one of the nine binary-operator lexemes — the
    /// compiler only reaches this after confirming membership.
    pub fn write_binary_op(&mut self, op: &str) {
        match op {
            "*" => self.write_call("Math.multiply", 2),
            "/" => self.write_call("Math.divide", 2),
            _ => {
                let command = BINARY_OP_COMMANDS
                    .get(op)
                    .unwrap_or_else(|| panic!("'{op}' is not a binary operator"));
                self.buf.push_str(command);
                self.buf.push('\n');
            }
        }
    }

    pub fn write_neg(&mut self) {
        self.buf.push_str("neg\n");
    }

    pub fn write_not(&mut self) {
        self.buf.push_str("not\n");
    }

    pub fn write_label(&mut self, label: &str) {
        self.buf.push_str(&format!("label {label}\n"));
    }

    pub fn write_goto(&mut self, label: &str) {
        self.buf.push_str(&format!("goto {label}\n"));
    }

    pub fn write_if_goto(&mut self, label: &str) {
        self.buf.push_str(&format!("if-goto {label}\n"));
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) {
        self.buf.push_str(&format!("call {name} {n_args}\n"));
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) {
        self.buf.push_str(&format!("function {name} {n_locals}\n"));
    }

    pub fn write_return(&mut self) {
        self.buf.push_str("return\n");
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for VmWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_text() {
        let mut w = VmWriter::new();
        w.write_push("constant", 7);
        w.write_pop("local", 2);
        assert_eq!(w.finish(), "push constant 7\npop local 2\n");
    }

    #[test]
    fn test_multiply_and_divide_lower_to_calls() {
        let mut w = VmWriter::new();
        w.write_binary_op("*");
        w.write_binary_op("/");
        assert_eq!(
            w.finish(),
            "call Math.multiply 2\ncall Math.divide 2\n"
        );
    }

    #[test]
    fn test_escaped_angle_and_amp_operators() {
        let mut w = VmWriter::new();
        w.write_binary_op("&lt;");
        w.write_binary_op("&gt;");
        w.write_binary_op("&amp;");
        assert_eq!(w.finish(), "lt\ngt\nand\n");
    }

    #[test]
    fn test_is_binary_operator() {
        assert!(is_binary_operator("+"));
        assert!(is_binary_operator("*"));
        assert!(!is_binary_operator("~"));
    }
}
