//! Jack Compiler - Main Entry Point
//!
//! Compiles Jack (`Nand2Tetris` Project 10/11) source into Hack VM code.
//!
//! # Usage
//! ```bash
//! cargo run <input.jack|directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use jack_compiler::{compile_file, RedefinitionPolicy};

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

/// Collects the `.jack` files to compile, sorted for deterministic output.
fn collect_sources(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        let mut jack_files: Vec<_> = fs::read_dir(input)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        jack_files.sort();
        if jack_files.is_empty() {
            return Err("no .jack files found in directory".into());
        }
        Ok(jack_files)
    } else {
        if input.extension().is_none_or(|ext| ext != "jack") {
            return Err("input file must have a .jack extension".into());
        }
        Ok(vec![input.to_path_buf()])
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack|directory>", args[0]);
        process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    let sources = collect_sources(input_path)?;

    for source in &sources {
        let lines = read_lines(source)?;
        let stem = file_stem(source);
        let file_name = format!("{stem}.jack");

        let vm = match compile_file(&file_name, &lines, RedefinitionPolicy::FirstWins) {
            Ok(vm) => vm,
            Err(err) => {
                eprintln!("{err}");
                process::exit(1);
            }
        };

        let output_path = source.with_extension("vm");
        fs::write(&output_path, vm)?;
        println!("Compilation complete: {} -> {}", source.display(), output_path.display());
    }

    Ok(())
}
