//! The instruction register and program counter.

/// Holds the opcode of the instruction currently being decoded, plus the
/// program counter. The argument byte lives in `memory.cache.wr` once
/// resolved, not here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlUnit {
    /// Decoded opcode of the current instruction.
    pub op: u8,
    /// Program counter, wraps modulo 256.
    pub pc: u8,
}

impl ControlUnit {
    pub fn new() -> Self {
        ControlUnit::default()
    }

    /// Advance the program counter by one, wrapping at 256.
    pub fn advance(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }
}
