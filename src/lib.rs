//! ## Overview
//! The LMC ("Little Man Computer") machine is a tiny von Neumann architecture
//! meant for teaching the fetch-decode-execute cycle. It has the following
//! properties:
//!
//! - Memory is a single 256-byte address space, addresses `0x00..0xFF`.
//! - The first 32 bytes (`0x00..0x1F`) are ROM: a bootstrap program lives
//!   there, and writes to it are refused.
//! - Every instruction is a `(opcode, argument)` byte pair; the opcode byte
//!   is itself a bit field of small orthogonal primitives (see
//!   [`instruction`]).
//! - A compiler (see [`compiler`]) translates a tiny mnemonic assembly
//!   language into this byte format, with a two-byte header giving the
//!   entry address and the instruction count.
//! - An interactive debugger (see [`debugger`]) can interpose on the cycle,
//!   single-step, or dump memory.
//!
//! ## Architecture
//! A [`Computer`] aggregates a [`Memory`] (the address space plus the
//! register/selection cache through which every access passes), a
//! [`ControlUnit`] (program counter and instruction register), an [`Alu`]
//! (accumulator and latched arithmetic opcode), a [`Bus`] (interactive or
//! file-backed input, text output), and a [`Debugger`] (break/print points
//! and debug mode). Running a program is a loop of three phases per
//! instruction: fetch, decode-and-execute, program-counter advance — see
//! [`Computer::run`] for the full description.
//!
//! ## Execution model
//! After construction the control unit starts at `pc = 0`, inside ROM,
//! running the bootstrap. The bootstrap copies the target program's header
//! and body out of the bus and into RAM, then jumps to the program's
//! declared entry address. From there the loaded program runs through the
//! same cycle the bootstrap used, until a `HLT` instruction or a fault turns
//! the machine off.
//!
//! ## Input and Output
//! The instruction set has one `IN` and one `OUT` family. Both are
//! byte-oriented: `IN` reads one value off the [`Bus`] into memory, `OUT`
//! writes one memory value to the bus as two hex digits.

pub mod error;
pub mod instruction;
pub mod memory;
pub mod control_unit;
pub mod alu;
pub mod bus;
pub mod debugger;
pub mod computer;
pub mod compiler;

pub use error::{CompileError, LmcError};
pub use instruction::OpCode;
pub use memory::Memory;
pub use control_unit::ControlUnit;
pub use alu::Alu;
pub use bus::{Bus, BusSource};
pub use debugger::Debugger;
pub use computer::{Computer, Origin};
