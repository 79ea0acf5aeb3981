//! Translates parsed VM commands into Hack assembly text.
//!
//! Generic over any [`Write`] sink so the translator can be driven against an
//! in-memory buffer in tests as well as a file in the CLI.

use std::io::{self, Write};

macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Clone, Copy)]
enum Segment {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl Segment {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "temp" => Some(Self::Temp),
            "pointer" => Some(Self::Pointer),
            "static" => Some(Self::Static),
            "constant" => Some(Self::Constant),
            _ => None,
        }
    }

    /// Base-pointer segments addressed as `*(seg+i)`.
    fn base_pointer_symbol(self) -> Option<&'static str> {
        match self {
            Self::Local => Some("LCL"),
            Self::Argument => Some("ARG"),
            Self::This => Some("THIS"),
            Self::That => Some("THAT"),
            _ => None,
        }
    }
}

/// Writes Hack assembly for a stream of VM commands.
///
/// Tracks the current source file (for static-variable mangling), the
/// current function (for label mangling), and a single monotone counter
/// shared between comparison labels and call return-address labels, exactly
/// as the VM language's label scheme requires.
pub struct CodeWriter<W: Write> {
    out: W,
    counter: usize,
    file_stem: String,
    function_name: String,
}

impl<W: Write> CodeWriter<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            counter: 0,
            file_stem: String::new(),
            function_name: String::new(),
        }
    }

    /// Sets the current source file stem, used for `file.i` static-segment mangling.
    pub fn set_file_stem(&mut self, stem: &str) {
        self.file_stem.clear();
        self.file_stem.push_str(stem);
    }

    #[inline]
    fn label_prefix(&self) -> String {
        format!("{}.{}", self.file_stem, self.function_name)
    }

    /// Emits the bootstrap sequence: `SP = 256`, then `call Sys.init 0`.
    ///
    /// Only emitted by the caller when translating a directory of files.
    pub fn write_bootstrap(&mut self) -> io::Result<()> {
        write_asm!(self.out,
            "// bootstrap"
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0)
    }

    pub fn write_arithmetic(&mut self, command: &str) -> io::Result<()> {
        writeln!(self.out, "// {command}")?;
        match command {
            "add" => self.write_binary("D+M"),
            "sub" => self.write_binary("M-D"),
            "and" => self.write_binary("D&M"),
            "or" => self.write_binary("D|M"),
            "neg" => self.write_unary("-M"),
            "not" => self.write_unary("!M"),
            "eq" => self.write_comparison("JEQ"),
            "gt" => self.write_comparison("JGT"),
            "lt" => self.write_comparison("JLT"),
            _ => unreachable!("arithmetic mnemonic validated by caller"),
        }
    }

    /// Pops both operands into D and `*(SP-1)`, computes `op`, leaves result in place.
    fn write_binary(&mut self, op: &str) -> io::Result<()> {
        self.write_stack_to_d()?;
        write_asm!(self.out, "A=A-1")?;
        writeln!(self.out, "M={op}")
    }

    fn write_unary(&mut self, op: &str) -> io::Result<()> {
        write_asm!(self.out,
            "@SP"
            "A=M-1"
        )?;
        writeln!(self.out, "M={op}")
    }

    /// Subtracts the two operands into D, branches to a fresh pair of labels
    /// to materialize -1 (true) or 0 (false), then writes D to the result slot.
    fn write_comparison(&mut self, jump: &str) -> io::Result<()> {
        let n = self.counter;
        self.counter += 1;

        self.write_stack_to_d()?;
        write_asm!(self.out, "A=A-1")?;
        write_asm!(self.out, "D=M-D")?;
        writeln!(self.out, "@TRUE__{n}")?;
        writeln!(self.out, "D;{jump}")?;
        write_asm!(self.out, "D=0")?;
        writeln!(self.out, "@D_TO_STACK__{n}")?;
        write_asm!(self.out, "0;JMP")?;
        writeln!(self.out, "(TRUE__{n})")?;
        write_asm!(self.out, "D=-1")?;
        writeln!(self.out, "(D_TO_STACK__{n})")?;
        write_asm!(self.out,
            "@SP"
            "A=M-1"
            "M=D"
        )
    }

    pub fn write_push_pop(&mut self, command: &str, segment: &str, index: i64) -> io::Result<()> {
        writeln!(self.out, "// {command} {segment} {index}")?;
        if command == "push" {
            self.write_push(segment, index)
        } else {
            self.write_pop(segment, index)
        }
    }

    fn write_push(&mut self, segment: &str, index: i64) -> io::Result<()> {
        match Segment::from_str(segment) {
            Some(Segment::Constant) => {
                writeln!(self.out, "@{index}")?;
                write_asm!(self.out, "D=A")?;
            }
            Some(Segment::Temp) => {
                writeln!(self.out, "@{}", 5 + index)?;
                write_asm!(self.out, "D=M")?;
            }
            Some(Segment::Pointer) => {
                let sym = if index == 0 { "THIS" } else { "THAT" };
                writeln!(self.out, "@{sym}")?;
                write_asm!(self.out, "D=M")?;
            }
            Some(Segment::Static) => {
                writeln!(self.out, "@{}.{}", self.file_stem, index)?;
                write_asm!(self.out, "D=M")?;
            }
            Some(seg) => {
                let sym = seg.base_pointer_symbol().expect("base-pointer segment");
                if index == 0 {
                    writeln!(self.out, "@{sym}")?;
                    write_asm!(self.out, "A=M" "D=M")?;
                } else {
                    writeln!(self.out, "@{index}")?;
                    write_asm!(self.out, "D=A")?;
                    writeln!(self.out, "@{sym}")?;
                    write_asm!(self.out, "A=D+M" "D=M")?;
                }
            }
            None => unreachable!("segment validated by caller"),
        }
        self.write_d_to_stack()
    }

    fn write_pop(&mut self, segment: &str, index: i64) -> io::Result<()> {
        match Segment::from_str(segment) {
            Some(Segment::Temp) => {
                self.write_stack_to_d()?;
                writeln!(self.out, "@{}", 5 + index)?;
                write_asm!(self.out, "M=D")
            }
            Some(Segment::Pointer) => {
                self.write_stack_to_d()?;
                let sym = if index == 0 { "THIS" } else { "THAT" };
                writeln!(self.out, "@{sym}")?;
                write_asm!(self.out, "M=D")
            }
            Some(Segment::Static) => {
                self.write_stack_to_d()?;
                writeln!(self.out, "@{}.{}", self.file_stem, index)?;
                write_asm!(self.out, "M=D")
            }
            Some(seg) => {
                let sym = seg.base_pointer_symbol().expect("base-pointer segment");
                writeln!(self.out, "@{index}")?;
                write_asm!(self.out, "D=A")?;
                writeln!(self.out, "@{sym}")?;
                write_asm!(self.out, "D=D+M")?;
                write_asm!(self.out, "@R13" "M=D")?;
                self.write_stack_to_d()?;
                write_asm!(self.out,
                    "@R13"
                    "A=M"
                    "M=D"
                )
            }
            None => unreachable!("segment validated by caller"),
        }
    }

    /// `label L` → `(file.function$L)`
    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "({}${label})", self.label_prefix())
    }

    /// `goto L` → unconditional jump to the mangled label.
    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "@{}${label}", self.label_prefix())?;
        write_asm!(self.out, "0;JMP")
    }

    /// `if-goto L` → pop into D, jump to the mangled label if D != 0.
    pub fn write_if_goto(&mut self, label: &str) -> io::Result<()> {
        self.write_stack_to_d()?;
        writeln!(self.out, "@{}${label}", self.label_prefix())?;
        write_asm!(self.out, "D;JNE")
    }

    /// `function f n` → label, then n zero-initialized local slots.
    pub fn write_function(&mut self, name: &str, n_locals: i64) -> io::Result<()> {
        self.function_name.clear();
        self.function_name.push_str(name);
        writeln!(self.out, "({name})")?;
        if n_locals > 0 {
            write_asm!(self.out, "@SP" "A=M")?;
            for _ in 0..n_locals {
                write_asm!(self.out, "M=0" "A=A+1")?;
            }
            writeln!(self.out, "@{n_locals}")?;
            write_asm!(self.out, "D=A" "@SP" "M=D+M")?;
        }
        Ok(())
    }

    /// `call f n` → push return address and the four saved segment pointers,
    /// reposition ARG/LCL, jump to `f`, and emit the return label.
    pub fn write_call(&mut self, name: &str, n_args: i64) -> io::Result<()> {
        let n = self.counter;
        self.counter += 1;
        let return_label = format!("{name}$ret.{n}");

        writeln!(self.out, "@{return_label}")?;
        write_asm!(self.out, "D=A")?;
        self.write_d_to_stack()?;

        for segment in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{segment}")?;
            write_asm!(self.out, "D=M")?;
            self.write_d_to_stack()?;
        }

        writeln!(self.out, "@5")?;
        write_asm!(self.out, "D=A")?;
        writeln!(self.out, "@{n_args}")?;
        write_asm!(self.out, "D=D+A" "@SP" "D=M-D" "@ARG" "M=D")?;
        write_asm!(self.out, "@SP" "D=M" "@LCL" "M=D")?;
        writeln!(self.out, "@{name}")?;
        write_asm!(self.out, "0;JMP")?;
        writeln!(self.out, "({return_label})")
    }

    /// `return` → restore the caller's frame and jump through the saved return address.
    pub fn write_return(&mut self) -> io::Result<()> {
        write_asm!(self.out, "@LCL" "D=M" "@5" "A=D-A" "D=M" "@R13" "M=D")?;
        self.write_stack_to_d()?;
        write_asm!(self.out, "@ARG" "A=M" "M=D")?;
        write_asm!(self.out, "@ARG" "D=M+1" "@SP" "M=D")?;
        for dest in ["THAT", "THIS", "ARG", "LCL"] {
            self.write_lcl_to_d()?;
            writeln!(self.out, "@{dest}")?;
            write_asm!(self.out, "M=D")?;
        }
        write_asm!(self.out, "@R13" "A=M" "0;JMP")
    }

    /// `D = *(LCL-1)`, then `LCL -= 1` — the walk-back-the-frame primitive `return` repeats four times.
    fn write_lcl_to_d(&mut self) -> io::Result<()> {
        write_asm!(self.out, "@LCL" "AM=M-1" "D=M")
    }

    fn write_d_to_stack(&mut self) -> io::Result<()> {
        write_asm!(self.out,
            "@SP"
            "AM=M+1"
            "A=A-1"
            "M=D"
        )
    }

    fn write_stack_to_d(&mut self) -> io::Result<()> {
        write_asm!(self.out,
            "@SP"
            "AM=M-1"
            "D=M"
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Consumes the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
