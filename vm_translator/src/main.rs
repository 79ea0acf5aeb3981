//! VM Translator - Main Entry Point
//!
//! Translates Hack VM (`Nand2Tetris` Project 7/8) stack-machine code into
//! Hack assembly.
//!
//! # Usage
//! ```bash
//! cargo run <input.vm|directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process;

use vm_translator::translate;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(Into::into)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string()
}

/// Collects translation units and the output path for either a single `.vm`
/// file (no bootstrap) or a directory of `.vm` files (bootstrap emitted).
fn collect_units(input: &Path) -> Result<(Vec<(String, Vec<String>)>, bool, String)> {
    if input.is_dir() {
        let mut vm_files: Vec<_> = fs::read_dir(input)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "vm"))
            .collect();
        vm_files.sort();

        if vm_files.is_empty() {
            return Err("no .vm files found in directory".into());
        }

        let mut units = Vec::with_capacity(vm_files.len());
        for path in &vm_files {
            units.push((file_stem(path), read_lines(path)?));
        }

        let dir_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Output")
            .to_string();
        let output = input.join(format!("{dir_name}.asm"));
        Ok((units, true, output.to_string_lossy().into_owned()))
    } else {
        if input.extension().is_none_or(|ext| ext != "vm") {
            return Err("input file must have a .vm extension".into());
        }
        let lines = read_lines(input)?;
        let output = input.with_extension("asm");
        Ok((
            vec![(file_stem(input), lines)],
            false,
            output.to_string_lossy().into_owned(),
        ))
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm|directory>", args[0]);
        process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    let (units, bootstrap, output_path) = collect_units(input_path)?;

    let asm = match translate(&units, bootstrap) {
        Ok(asm) => asm,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    fs::write(&output_path, asm)?;
    println!("Translation complete: {} -> {output_path}", args[1]);
    Ok(())
}
