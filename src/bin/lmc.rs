//! `lmc`: the command-line front door. Argument parsing is deliberately
//! minimal and hand-rolled (no CLI-parsing crate appears anywhere in the
//! retrieval pack's non-shader repositories) — this binary only wires the
//! already-built library surface to `std::env::args`.

#[macro_use]
extern crate colorify;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lmc::compiler::compile;
use lmc::error::CompileError;
use lmc::instruction::OpCode;
use lmc::{Bus, Computer};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    ExitCode::from(dispatch(&args) as u8)
}

fn dispatch(args: &[String]) -> i32 {
    match args {
        [] => run_files(&[], false, None),
        [flag, ..] if flag == "-v" => {
            print_version();
            0
        }
        [flag, ..] if flag == "-w" => {
            print_license();
            0
        }
        [flag, rest @ ..] if flag == "-c" => cmd_compile(rest),
        _ => {
            let mut debug = false;
            let mut bootstrap: Option<PathBuf> = None;
            let mut files = Vec::new();
            let mut rest = args.iter();
            while let Some(arg) = rest.next() {
                match arg.as_str() {
                    "-d" => debug = true,
                    "-b" => bootstrap = rest.next().map(PathBuf::from),
                    other => files.push(PathBuf::from(other)),
                }
            }
            run_files(&files, debug, bootstrap.as_deref())
        }
    }
}

fn print_version() {
    printlnc!(yellow: "lmc {}", VERSION);
}

fn print_license() {
    println!("lmc {}", VERSION);
    println!("Copyright (C) the contributors.");
    println!("License GPL-3.0: GNU GPL version 3.");
    println!("This is free software: you are free to change and redistribute it.");
}

fn cmd_compile(rest: &[String]) -> i32 {
    let Some(source) = rest.first() else {
        printlnc!(red: "lmc -c: missing source file");
        return 1;
    };
    let source = Path::new(source);
    let dest = rest.get(1).map(Path::new);
    match compile(source, dest) {
        Ok(written) => {
            println!("LMC: compiled to '{}'", written.display());
            0
        }
        Err(CompileError::Syntax { line, token }) => {
            printlnc!(red: "{}:{}: syntax error: '{}'", source.display(), line, token);
            1
        }
        Err(e) => {
            printlnc!(red: "{}: {}", source.display(), e);
            1
        }
    }
}

/// Run each file in sequence (or one interactive session if `files` is
/// empty), returning the exit code of the last one: the final value of the
/// word register at the last program's shutdown.
fn run_files(files: &[PathBuf], debug: bool, bootstrap: Option<&Path>) -> i32 {
    if files.is_empty() {
        return run_one(None, debug, bootstrap);
    }
    let mut code = 0;
    for file in files {
        code = run_one(Some(file), debug, bootstrap);
    }
    code
}

fn run_one(file: Option<&Path>, debug: bool, bootstrap: Option<&Path>) -> i32 {
    let bus = match file {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => Bus::from_reader(Box::new(Cursor::new(bytes))),
            Err(e) => {
                printlnc!(red: "{}: {}", path.display(), e);
                return 1;
            }
        },
        None => Bus::interactive(),
    };

    let mut computer = Computer::new(bus);

    if let Some(boot_path) = bootstrap {
        match std::fs::read(boot_path) {
            Ok(bytes) => {
                if let Err(e) = computer.load_bootstrap(&bytes) {
                    printlnc!(red: "{}: {}", boot_path.display(), e);
                    return 1;
                }
            }
            Err(e) => {
                printlnc!(red: "{}: {}", boot_path.display(), e);
                return 1;
            }
        }
    }

    if debug {
        // Any non-zero debug opcode arms `dbg_phase_1`; DEBUG itself is the
        // natural "stop before every instruction" default.
        computer.debugger.opcode = OpCode::DEBUG.0;
    }

    match computer.run() {
        Ok(word) => word as i32,
        Err(e) => {
            printlnc!(red: "{}", e);
            1
        }
    }
}
