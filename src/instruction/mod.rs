//! ## Opcode model
//! Every instruction byte decomposes into orthogonal bit-flag primitives.
//! `flags` names the eight bits; the associated constants on [`OpCode`]
//! name every combined instruction the machine and its debugger recognise.
//!
//! ```text
//! bit   primitive       meaning
//! 0x01  INV             invert meaning / negate / test-sign
//! 0x02  NOT             boolean NOT / test-zero
//! 0x04  HLT             halt marker
//! 0x08  WRT             write direction (else read)
//! 0x10  JMP             branch marker
//! 0x20  ADD             arithmetic marker
//! 0x40  VAR             argument is an address
//! 0x80  PTR             argument is a pointer (dereference once more)
//! ```
//!
//! `kind()` strips the indirection bits to recover the bare operation;
//! `indirection()` keeps only them. Combined with [`crate::instruction::keywords`]
//! this is the entire opcode⟷mnemonic surface the compiler and disassembler
//! need.

pub mod keywords;

pub use self::keywords::{keyword_of, opcode_of};

/// Bit-level primitives an [`OpCode`] is built from.
pub mod flags {
    pub const INV: u8 = 0x01;
    pub const NOT: u8 = 0x02;
    pub const HLT: u8 = 0x04;
    pub const WRT: u8 = 0x08;
    pub const JMP: u8 = 0x10;
    pub const ADD: u8 = 0x20;
    pub const VAR: u8 = 0x40;
    pub const PTR: u8 = 0x80;
    /// Both indirection bits at once: `*@ addr`.
    pub const INDIR: u8 = VAR | PTR;
}

use self::flags::*;

/// How many times a decoded argument must be dereferenced before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirection {
    /// Bare literal: the argument byte itself is the value.
    Literal,
    /// `@ addr`: one dereference, the argument names an address.
    Address,
    /// `*@ addr`: two dereferences, the argument names a pointer.
    Pointer,
}

impl Indirection {
    /// Number of extra `memory[x]` reads beyond the first.
    pub fn extra_reads(self) -> u8 {
        match self {
            Indirection::Literal => 0,
            Indirection::Address => 1,
            Indirection::Pointer => 2,
        }
    }
}

/// A single LMC instruction byte.
///
/// This is a thin newtype, not an enum: the bit layout is part of the
/// external compiled-file format (it is the byte written to disk), so it is
/// kept exactly as the machine sees it rather than re-encoded through a
/// Rust-side discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpCode(pub u8);

impl OpCode {
    pub const LOAD: OpCode = OpCode(0x00);
    pub const STORE: OpCode = OpCode(WRT);
    pub const IN: OpCode = OpCode(WRT | INV);
    pub const OUT: OpCode = OpCode(INV);
    pub const JUMP: OpCode = OpCode(JMP);
    pub const BRN: OpCode = OpCode(JMP | INV);
    pub const BRZ: OpCode = OpCode(JMP | NOT);
    pub const ADD: OpCode = OpCode(ADD);
    pub const SUB: OpCode = OpCode(ADD | INV);
    pub const NAND: OpCode = OpCode(ADD | NOT);
    pub const HLT: OpCode = OpCode(HLT);
    /// Compiler-only pseudo-instruction: never appears in a decoded stream.
    pub const START: OpCode = OpCode(PTR);

    pub const DEBUG: OpCode = OpCode(HLT | INV);
    pub const DUMP: OpCode = OpCode(HLT | INV | NOT);
    pub const BREAK: OpCode = OpCode(HLT | INV | WRT);
    pub const FREE: OpCode = OpCode(HLT | INV | WRT | NOT);
    pub const CONT: OpCode = OpCode(HLT | INV | JMP);
    pub const NEXT: OpCode = OpCode(HLT | INV | JMP | NOT);
    pub const PRINT: OpCode = OpCode(HLT | INV | ADD);
    pub const CLEAR: OpCode = OpCode(HLT | INV | ADD | NOT);

    /// The operation this byte encodes, with any indirection bits masked
    /// off. Two opcodes with different indirection but the same operation
    /// compare equal under this view.
    pub fn operation(self) -> OpCode {
        OpCode(self.0 & !INDIR)
    }

    /// The indirection level encoded by the VAR/PTR bits.
    pub fn indirection(self) -> Indirection {
        match self.0 & INDIR {
            0 => Indirection::Literal,
            VAR => Indirection::Address,
            _ => Indirection::Pointer, // VAR|PTR, and PTR alone never occurs on real opcodes
        }
    }

    /// True if this is one of the eight debugger instructions (the `HLT|INV`
    /// marker is set and this is not the short `HLT` opcode itself).
    pub fn is_debug(self) -> bool {
        self.operation().0 & (HLT | INV) == (HLT | INV)
    }

    /// True if phase three (the program-counter advance) must be skipped
    /// after dispatching this operation.
    pub fn skips_phase_three(self) -> bool {
        let op = self.operation();
        op.0 & JMP != 0 || op == OpCode::HLT
    }

    /// True if this operation is one of the three arithmetic instructions
    /// and so should be latched into the ALU.
    pub fn is_arithmetic(self) -> bool {
        self.operation().0 & ADD != 0 && self.operation().0 & HLT == 0
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kw = keyword_of(*self);
        if kw.is_empty() {
            write!(f, "{:#04x}", self.0)
        } else {
            write!(f, "{} ({:#04x})", kw, self.0)
        }
    }
}

impl From<u8> for OpCode {
    fn from(byte: u8) -> Self {
        OpCode(byte)
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_values_match_the_bit_table() {
        assert_eq!(OpCode::LOAD.0, 0x00);
        assert_eq!(OpCode::STORE.0, 0x08);
        assert_eq!(OpCode::IN.0, 0x09);
        assert_eq!(OpCode::OUT.0, 0x01);
        assert_eq!(OpCode::JUMP.0, 0x10);
        assert_eq!(OpCode::BRN.0, 0x11);
        assert_eq!(OpCode::BRZ.0, 0x12);
        assert_eq!(OpCode::ADD.0, 0x20);
        assert_eq!(OpCode::SUB.0, 0x21);
        assert_eq!(OpCode::NAND.0, 0x22);
        assert_eq!(OpCode::HLT.0, 0x04);
        assert_eq!(OpCode::START.0, 0x80);
        assert_eq!(OpCode::DEBUG.0, 0x05);
        assert_eq!(OpCode::DUMP.0, 0x07);
        assert_eq!(OpCode::BREAK.0, 0x0D);
        assert_eq!(OpCode::FREE.0, 0x0F);
        assert_eq!(OpCode::CONT.0, 0x15);
        assert_eq!(OpCode::NEXT.0, 0x17);
        assert_eq!(OpCode::PRINT.0, 0x25);
        assert_eq!(OpCode::CLEAR.0, 0x27);
    }

    #[test]
    fn indirection_levels_decompose_correctly() {
        let store_var = OpCode(OpCode::STORE.0 | flags::VAR);
        assert_eq!(store_var.operation(), OpCode::STORE);
        assert_eq!(store_var.indirection(), Indirection::Address);
        assert_eq!(store_var.indirection().extra_reads(), 1);

        let in_indir = OpCode(OpCode::IN.0 | flags::INDIR);
        assert_eq!(in_indir.operation(), OpCode::IN);
        assert_eq!(in_indir.indirection(), Indirection::Pointer);
        assert_eq!(in_indir.indirection().extra_reads(), 2);
    }

    #[test]
    fn jump_family_and_hlt_skip_phase_three() {
        assert!(OpCode::JUMP.skips_phase_three());
        assert!(OpCode::BRN.skips_phase_three());
        assert!(OpCode::BRZ.skips_phase_three());
        assert!(OpCode::HLT.skips_phase_three());
        assert!(!OpCode::LOAD.skips_phase_three());
        assert!(!OpCode::ADD.skips_phase_three());
    }

    #[test]
    fn debug_instructions_are_recognised() {
        for op in [
            OpCode::DEBUG,
            OpCode::DUMP,
            OpCode::BREAK,
            OpCode::FREE,
            OpCode::CONT,
            OpCode::NEXT,
            OpCode::PRINT,
            OpCode::CLEAR,
        ] {
            assert!(op.is_debug(), "{:?} should be a debug instruction", op);
        }
        assert!(!OpCode::HLT.is_debug());
    }
}
