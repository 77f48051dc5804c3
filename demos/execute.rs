//! Compile and run a source file in one shot, wiring the machine's bus
//! straight to stdin/stdout with no subprocess — the same idiom
//! `tests/scenarios.rs` drives with a `Cursor` standing in for a terminal.

use std::fs;

use lmc::compiler::compile_str;
use lmc::{Bus, Computer};

fn main() {
    let path = std::env::args().nth(1).expect("missing source file");
    let source = fs::read_to_string(&path).unwrap();
    let program = compile_str(&source).unwrap();

    let bus = Bus::from_reader(Box::new(std::io::Cursor::new(program)));
    let mut computer = Computer::new(bus);
    let word = computer.run().unwrap();
    eprintln!("final word register: {:#04x}", word);
}
