//! Accumulator and the three arithmetic operations.

use crate::instruction::OpCode;

/// The arithmetic-logic unit: an accumulator plus the most recently latched
/// arithmetic opcode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alu {
    pub acc: u8,
    /// The last ADD/SUB/NAND opcode seen during decode; `calc` reads this
    /// rather than re-deriving it from the instruction currently executing
    /// (the explicit-latch variant — see `DESIGN.md`).
    pub opcode: u8,
}

impl Alu {
    pub fn new() -> Self {
        Alu::default()
    }

    /// Latch `op` as the current arithmetic operation. Only ADD, SUB and
    /// NAND are meaningful latches; anything else leaves `opcode` unchanged,
    /// mirroring the fact that only those three operations appear here.
    pub fn latch(&mut self, op: OpCode) {
        if op.is_arithmetic() {
            self.opcode = op.0;
        }
    }

    /// Apply the latched arithmetic operation against `wr`, updating and
    /// returning the new accumulator value.
    pub fn calc(&mut self, wr: u8) -> u8 {
        let op = OpCode(self.opcode);
        self.acc = if op == OpCode::SUB {
            self.acc.wrapping_sub(wr)
        } else if op == OpCode::NAND {
            if self.acc != 0 && wr != 0 { 0 } else { 1 }
        } else {
            // OpCode::ADD, and the default for an unlatched ALU.
            self.acc.wrapping_add(wr)
        };
        self.acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_modulo_256() {
        let mut alu = Alu::new();
        alu.latch(OpCode::ADD);
        alu.acc = 0xff;
        assert_eq!(alu.calc(0x02), 0x01);
    }

    #[test]
    fn sub_wraps_modulo_256() {
        let mut alu = Alu::new();
        alu.latch(OpCode::SUB);
        alu.acc = 0x00;
        assert_eq!(alu.calc(0x01), 0xff);
    }

    #[test]
    fn nand_is_boolean_not_bitwise() {
        let mut alu = Alu::new();
        alu.latch(OpCode::NAND);
        alu.acc = 0x02;
        assert_eq!(alu.calc(0x04), 0);
        alu.acc = 0x00;
        assert_eq!(alu.calc(0x04), 1);
    }
}
