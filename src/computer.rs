//! The machine itself: the three-phase cycle, bootstrap loading, and the
//! debugger's three sub-phases (which reuse phase two wholesale).

use crate::alu::Alu;
use crate::bus::Bus;
use crate::control_unit::ControlUnit;
use crate::debugger::{format_dump, Debugger};
use crate::error::LmcError;
use crate::instruction::OpCode;
use crate::memory::{Memory, MAXROM};

/// Who is asking phase two to resolve an argument: the program counter
/// (the normal case) or a debugger-supplied address already sitting in
/// `memory.cache.wr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Program,
    Debugger,
}

/// The bootstrap installed when no custom one is supplied. Reads the target
/// program's two header bytes off the bus, copies its body into RAM, then
/// jumps to the entry address — see `DESIGN.md` for why the final `JUMP` at
/// `0x1F` needs no operand byte of its own.
pub const DEFAULT_BOOTSTRAP: [u8; MAXROM] = [
    0x49, 0x20, // IN|VAR  0x20      ; memory[0x20] := entry address byte
    0x49, 0x22, // IN|VAR  0x22      ; memory[0x22] := program size byte
    0x40, 0x20, // LOAD|VAR 0x20     ; acc := entry address
    0x48, 0x21, // STORE|VAR 0x21    ; memory[0x21] := entry address (copy cursor)
    0xC9, 0x21, // IN|INDIR 0x21     ; memory[*memory[0x21]] := next program byte
    0x40, 0x22, // LOAD|VAR 0x22     ; acc := remaining byte count
    0x21, 0x01, // SUB      0x01     ; acc -= 1
    0x12, 0x1F, // BRZ      0x1F     ; done copying -> fall into the final JUMP
    0x48, 0x22, // STORE|VAR 0x22    ; memory[0x22] := remaining byte count
    0x40, 0x21, // LOAD|VAR 0x21     ; acc := copy cursor
    0x20, 0x01, // ADD      0x01     ; acc += 1
    0x10, 0x06, // JUMP     0x06     ; loop back to the IN|INDIR copy step
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // memory[0x18..0x1F) unused
    0x10, // JUMP (bare opcode, no operand byte in ROM; operand is memory[0x20])
];

/// The aggregate machine: memory, control unit, ALU, bus, debugger, and the
/// run flag.
pub struct Computer {
    pub memory: Memory,
    pub control: ControlUnit,
    pub alu: Alu,
    pub bus: Bus,
    pub debugger: Debugger,
    pub on: bool,
}

impl Computer {
    /// A freshly reset machine with the default bootstrap already installed
    /// and bound to `bus`.
    pub fn new(bus: Bus) -> Self {
        let mut memory = Memory::new();
        memory.load(0, &DEFAULT_BOOTSTRAP);
        Computer {
            memory,
            control: ControlUnit::new(),
            alu: Alu::new(),
            bus,
            debugger: Debugger::new(),
            on: true,
        }
    }

    /// Replace the bootstrap with a custom compiled one. `bytes` is the
    /// whole compiled file: a two-byte header (the entry byte is ignored —
    /// a bootstrap always loads at `0x00`) followed by its body.
    pub fn load_bootstrap(&mut self, bytes: &[u8]) -> Result<(), LmcError> {
        if bytes.len() < 2 {
            return Err(LmcError::BootstrapMissingSize);
        }
        let declared = bytes[1] as usize;
        if declared == 0 {
            // Declared-empty bootstrap: keep whatever is already installed
            // (the default, installed at construction time).
            return Ok(());
        }
        if declared > MAXROM {
            return Err(LmcError::BootstrapTooLarge { declared });
        }
        let body = &bytes[2..];
        if body.len() < declared {
            return Err(LmcError::BootstrapSizeMismatch {
                declared,
                read: body.len(),
            });
        }
        self.memory.load(0, &body[..declared]);
        Ok(())
    }

    /// Phase one: fetch the opcode byte at `pc` and advance past it.
    pub fn phase_one(&mut self) {
        self.control.op = self.memory.read(self.control.pc);
        self.control.advance();
    }

    /// Phase two: decode the fetched opcode, resolve its argument through
    /// zero, one, or two extra dereferences depending on its indirection
    /// bits, and dispatch. Returns whether phase three (the `pc` advance)
    /// should run for this cycle.
    ///
    /// Reused verbatim by the debugger (`origin = Origin::Debugger`): the
    /// only difference is where the argument's starting address comes from.
    pub fn phase_two(&mut self, origin: Origin) -> Result<bool, LmcError> {
        let opcode = OpCode(self.control.op);
        let operation = opcode.operation();
        self.alu.latch(operation);

        self.memory.cache.sr = match origin {
            Origin::Program => self.control.pc,
            Origin::Debugger => self.memory.cache.wr,
        };
        for _ in 0..opcode.indirection().extra_reads() {
            self.memory.cache.sr = self.memory.read(self.memory.cache.sr);
        }
        self.memory.cache.wr = self.memory.read(self.memory.cache.sr);

        self.dispatch(operation)
    }

    /// Phase three: advance `pc` past the argument byte.
    pub fn phase_three(&mut self) {
        self.control.advance();
    }

    fn checked_write(&mut self, addr: u8, value: u8) -> Result<(), LmcError> {
        match self.memory.write(addr, value) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.on = false;
                Err(e)
            }
        }
    }

    fn dispatch(&mut self, operation: OpCode) -> Result<bool, LmcError> {
        let wr = self.memory.cache.wr;
        let sr = self.memory.cache.sr;
        match operation {
            OpCode::LOAD => {
                self.alu.acc = wr;
                Ok(true)
            }
            OpCode::STORE => {
                self.checked_write(sr, self.alu.acc)?;
                Ok(true)
            }
            OpCode::IN => match self.bus.bus_input()? {
                Some(byte) => {
                    self.checked_write(sr, byte)?;
                    Ok(true)
                }
                None => {
                    self.on = false;
                    Ok(false)
                }
            },
            OpCode::OUT => {
                self.bus.bus_output(wr)?;
                Ok(true)
            }
            OpCode::JUMP => {
                self.control.pc = wr;
                Ok(false)
            }
            OpCode::BRN => {
                if self.alu.acc & 0x80 != 0 {
                    self.control.pc = wr;
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
            OpCode::BRZ => {
                if self.alu.acc == 0 {
                    self.control.pc = wr;
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
            OpCode::HLT => {
                self.on = false;
                Ok(false)
            }
            OpCode::ADD | OpCode::SUB | OpCode::NAND => {
                self.alu.calc(wr);
                Ok(true)
            }
            OpCode::DEBUG => {
                self.debugger.opcode = wr;
                Ok(self.debugger.opcode != 0)
            }
            OpCode::BREAK => {
                self.debugger.brk = wr;
                Ok(true)
            }
            OpCode::FREE => {
                self.debugger.brk = 0;
                Ok(true)
            }
            OpCode::PRINT => {
                self.debugger.prt = wr;
                Ok(true)
            }
            OpCode::CLEAR => {
                self.debugger.prt = 0;
                Ok(true)
            }
            OpCode::CONT => {
                self.debugger.opcode = wr;
                Ok(false)
            }
            // Diverges from the literal C source, which falls NEXT through
            // to the generic "keep prompting" case and so never actually
            // steps: see DESIGN.md. A NEXT that never steps would make the
            // debugger's own step command a no-op.
            OpCode::NEXT => Ok(false),
            OpCode::DUMP => {
                let start = wr;
                let end = match self.bus.bus_input()? {
                    Some(b) => b,
                    None => {
                        self.on = false;
                        return Ok(true);
                    }
                };
                let text = format_dump(self.memory.as_slice(), start, end);
                self.bus.write_line(text.trim_end())?;
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    fn dbg_phase_one(&mut self) -> Result<bool, LmcError> {
        if !self.on || self.debugger.is_off() {
            return Ok(false);
        }
        if self.debugger.hits_print_point(self.control.pc) {
            let value = self.memory.read(self.control.pc);
            self.bus
                .write_line(&format!("{:#04x}: {:02x}", self.control.pc, value))?;
        }
        if self.debugger.is_fast_forwarding(self.control.pc) {
            return Ok(false);
        }
        Ok(true)
    }

    fn dbg_phase_two(&mut self) -> Result<bool, LmcError> {
        let saved_prompt = std::mem::replace(
            &mut self.bus.prompt,
            format!(
                "PC: {:02x}, ACC: {:02x} ? >",
                self.control.pc, self.alu.acc
            ),
        );
        let result = (|| -> Result<bool, LmcError> {
            let op = match self.bus.bus_input()? {
                Some(b) => b,
                None => {
                    self.on = false;
                    return Ok(false);
                }
            };
            self.control.op = op;
            let arg = match self.bus.bus_input()? {
                Some(b) => b,
                None => {
                    self.on = false;
                    return Ok(false);
                }
            };
            self.memory.cache.wr = arg;
            Ok(true)
        })();
        self.bus.prompt = saved_prompt;
        result
    }

    fn dbg_phase_three(&mut self) -> Result<bool, LmcError> {
        self.phase_two(Origin::Debugger)
    }

    /// Run until the machine turns itself off (`HLT`, a ROM-write fault, or
    /// interactive EOF), returning the final word register value (not the
    /// accumulator — they diverge, e.g. at `HLT` the argument-fetch step
    /// still leaves its operand byte in `wr`).
    pub fn run(&mut self) -> Result<u8, LmcError> {
        while self.on {
            if self.dbg_phase_one()? {
                loop {
                    if !self.dbg_phase_two()? || !self.on {
                        break;
                    }
                    let keep_prompting = self.dbg_phase_three()?;
                    if !self.on || !keep_prompting {
                        break;
                    }
                }
                if !self.on {
                    break;
                }
            }
            self.phase_one();
            let proceed = self.phase_two(Origin::Program)?;
            if proceed {
                self.phase_three();
            }
        }
        Ok(self.memory.cache.wr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusSource;
    use crate::instruction::flags;
    use std::io::Cursor;

    fn computer_with_program(header_and_body: &[u8]) -> (Computer, std::rc::Rc<std::cell::RefCell<Vec<u8>>>) {
        use std::cell::RefCell;
        use std::rc::Rc;
        use std::io::{BufRead, Write};

        struct SharedSink(Rc<RefCell<Vec<u8>>>);
        impl Write for SharedSink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.borrow_mut().write(buf)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let reader: Box<dyn BufRead> = Box::new(Cursor::new(header_and_body.to_vec()));
        let mut bus = Bus::new(BusSource::File(reader), Box::new(std::io::sink()));
        let sink = Rc::new(RefCell::new(Vec::new()));
        bus.set_output(Box::new(SharedSink(sink.clone())));
        (Computer::new(bus), sink)
    }

    #[test]
    fn default_bootstrap_is_self_consistent_with_the_jump_at_0x1f() {
        assert_eq!(DEFAULT_BOOTSTRAP[0x1F], OpCode::JUMP.0);
        assert_eq!(DEFAULT_BOOTSTRAP.len(), MAXROM);
    }

    #[test]
    fn product_program_three_times_eight() {
        // header(unused by bootstrap) + a program whose entry loads a
        // bus-fed byte into the accumulator then halts with a literal exit
        // code of its own (not the real multiply loop, just enough to
        // exercise IN/LOAD/HLT through the bootstrap hand-off).
        let program_entry = 0x23u8;
        let program = [
            OpCode::IN.0 | flags::VAR, 0x30,
            OpCode::LOAD.0 | flags::VAR, 0x30,
            OpCode::HLT.0, 0x77,
        ];
        let mut bytes = vec![program_entry, program.len() as u8];
        bytes.extend_from_slice(&program);
        bytes.push(0x03);
        let (mut computer, _out) = computer_with_program(&bytes);
        let word = computer.run().unwrap();
        // `run()` returns the word register, not the accumulator: the final
        // `HLT 0x77` leaves its own literal argument byte in `wr`, distinct
        // from the `0x03` the accumulator picked up from the bus.
        assert_eq!(computer.alu.acc, 0x03);
        assert_eq!(word, 0x77);
    }

    #[test]
    fn rom_write_fault_turns_the_machine_off() {
        let (mut computer, _out) = computer_with_program(&[0x21, 0]);
        let err = computer.memory.write(0x01, 0xff).unwrap_err();
        assert!(matches!(err, LmcError::RomWrite { address: 0x01 }));
    }

    #[test]
    fn debugger_next_steps_once_and_debug_zero_via_indirected_arg_exits() {
        // Bypasses the bootstrap entirely (loads a tiny program straight
        // into RAM and points `pc` at it) so the debug-command stream below
        // only has to account for the program's own three instructions, not
        // the bootstrap's. Exercises the run loop's debugger interposition
        // end-to-end: two `NEXT`s step the program one instruction at a
        // time, then a `DEBUG` command leaves the debugger. Per the
        // argument-fetch quirk noted in `DESIGN.md`, the typed `DEBUG`
        // argument is read as an *address*, not the mode value directly —
        // `50` is chosen because that RAM cell is still zero, so it
        // dereferences to the `0` that actually disables the debugger.
        use std::cell::RefCell;
        use std::io::{BufRead, Write};
        use std::rc::Rc;

        struct SharedSink(Rc<RefCell<Vec<u8>>>);
        impl Write for SharedSink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.borrow_mut().write(buf)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let reader: Box<dyn BufRead> = Box::new(Cursor::new(b"17 00\n17 00\n05 50\n".to_vec()));
        let mut bus = Bus::new(BusSource::Interactive(reader), Box::new(std::io::sink()));
        let sink = Rc::new(RefCell::new(Vec::new()));
        bus.set_output(Box::new(SharedSink(sink.clone())));

        let mut computer = Computer::new(bus);
        let entry = 0x40u8;
        computer.memory.load(
            entry as usize,
            &[OpCode::LOAD.0, 0x07, OpCode::OUT.0, 0xab, OpCode::HLT.0, 0x00],
        );
        computer.control.pc = entry;
        computer.debugger.opcode = OpCode::DEBUG.0;

        let word = computer.run().unwrap();
        // `run()` returns the word register: the final `HLT 0x00` leaves its
        // own literal argument byte there, not the `0x07` the `LOAD` put in
        // the accumulator.
        assert_eq!(computer.alu.acc, 0x07);
        assert_eq!(word, 0x00);
        assert!(String::from_utf8(sink.borrow().clone()).unwrap().contains("ab"));
        assert_eq!(
            computer.debugger.opcode, 0,
            "DEBUG command must have left the debugger before HLT"
        );
    }

    #[test]
    fn load_bootstrap_rejects_oversize_declared_size() {
        let (mut computer, _out) = computer_with_program(&[0x21, 0]);
        let oversize = {
            let mut v = vec![0u8, 0x38];
            v.extend(std::iter::repeat(0u8).take(0x38));
            v
        };
        let err = computer.load_bootstrap(&oversize).unwrap_err();
        assert!(matches!(err, LmcError::BootstrapTooLarge { declared: 0x38 }));
    }
}
