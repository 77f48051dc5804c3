//! The 256-byte address space and the register/selection cache every access
//! passes through.

use crate::error::LmcError;

/// Size of the address space.
pub const MAXRAM: usize = 256;
/// First RAM address; everything below is ROM.
pub const MAXROM: usize = 0x20;

/// The register/selection cache (`wr`/`sr` in the original machine): every
/// memory access goes through these two registers rather than touching the
/// backing array directly, which is what lets phase two treat "the argument
/// slot" and "a debugger-supplied address" identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cache {
    /// Word Register: the value most recently read or about to be written.
    pub wr: u8,
    /// Selection Register: the address `wr` was read from or will be
    /// written to.
    pub sr: u8,
}

/// The machine's single 256-byte memory, split into a read-only bootstrap
/// prefix and the remaining RAM.
#[derive(Debug, Clone)]
pub struct Memory {
    pub cache: Cache,
    ram: [u8; MAXRAM],
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            cache: Cache::default(),
            ram: [0; MAXRAM],
        }
    }

    /// Read the byte at `addr`, unconditionally.
    pub fn read(&self, addr: u8) -> u8 {
        self.ram[addr as usize]
    }

    /// Write `value` at `addr`. Addresses below [`MAXROM`] are refused: the
    /// write does not happen, and a [`LmcError::RomWrite`] is returned so
    /// the caller can turn the machine off and report the fault.
    pub fn write(&mut self, addr: u8, value: u8) -> Result<(), LmcError> {
        if (addr as usize) < MAXROM {
            return Err(LmcError::RomWrite { address: addr });
        }
        self.ram[addr as usize] = value;
        Ok(())
    }

    /// Overwrite a contiguous range starting at `addr`, bypassing ROM
    /// protection. Used only by bootstrap/program loading, which is allowed
    /// to populate the ROM prefix directly.
    pub fn load(&mut self, addr: usize, bytes: &[u8]) {
        self.ram[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    /// Borrow the full address space, e.g. for a debugger dump.
    pub fn as_slice(&self) -> &[u8; MAXRAM] {
        &self.ram
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_writes_are_refused_and_leave_memory_untouched() {
        let mut mem = Memory::new();
        let before = *mem.as_slice();
        let err = mem.write(0x01, 0xff).unwrap_err();
        assert!(matches!(err, LmcError::RomWrite { address: 0x01 }));
        assert_eq!(*mem.as_slice(), before);
    }

    #[test]
    fn ram_writes_succeed() {
        let mut mem = Memory::new();
        mem.write(0x20, 0x42).unwrap();
        assert_eq!(mem.read(0x20), 0x42);
    }

    #[test]
    fn load_bypasses_rom_protection() {
        let mut mem = Memory::new();
        mem.load(0, &[0x11, 0x22, 0x33]);
        assert_eq!(mem.read(0), 0x11);
        assert_eq!(mem.read(2), 0x33);
    }
}
