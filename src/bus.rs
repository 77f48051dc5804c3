//! Bus input/output: the machine's only interaction with the outside world.

use crate::error::LmcError;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Where `IN` reads its bytes from.
///
/// Interactive and file sources differ in two ways, both load-bearing for
/// `bus_input`: only the interactive source gets the prompt printed before
/// a read, and a file source reads exactly one raw byte per call while the
/// interactive source tokenizes and hex-parses whitespace-separated text.
/// Both are boxed trait objects rather than concrete `Stdin`/`File` types so
/// tests can stand in a `Cursor<Vec<u8>>` for either one.
pub enum BusSource {
    Interactive(Box<dyn BufRead>),
    File(Box<dyn BufRead>),
}

impl BusSource {
    pub fn interactive_stdin() -> Self {
        BusSource::Interactive(Box::new(io::BufReader::new(io::stdin())))
    }
}

/// The machine's input/output peripheral.
pub struct Bus {
    source: BusSource,
    output: Box<dyn Write>,
    /// Prompt printed before each interactive read; swapped by the debugger
    /// while it has control and restored afterwards.
    pub prompt: String,
    /// Last value read from the bus.
    pub buffer: u8,
    pending: VecDeque<String>,
    /// What `reset_to_interactive` switches to once the file source hits
    /// EOF. `None` means "real stdin", the normal case; tests substitute a
    /// `Cursor` here so the file-to-interactive handoff is reproducible.
    interactive_fallback: Option<Box<dyn BufRead>>,
}

const DEFAULT_PROMPT: &str = "? >";

impl Bus {
    pub fn new(source: BusSource, output: Box<dyn Write>) -> Self {
        Bus {
            source,
            output,
            prompt: DEFAULT_PROMPT.to_string(),
            buffer: 0,
            pending: VecDeque::new(),
            interactive_fallback: None,
        }
    }

    /// A bus reading from stdin and writing to stdout.
    pub fn interactive() -> Self {
        Bus::new(BusSource::interactive_stdin(), Box::new(io::stdout()))
    }

    /// A bus reading raw bytes from `reader`, falling back to stdin on EOF,
    /// writing to stdout.
    pub fn from_reader(reader: Box<dyn BufRead>) -> Self {
        Bus::new(BusSource::File(reader), Box::new(io::stdout()))
    }

    /// A bus reading raw bytes from `reader`, falling back to `interactive`
    /// (rather than real stdin) once that reader hits EOF. This is what lets
    /// a test drive the file-then-interactive handoff deterministically: a
    /// compiled program arrives as `reader`, and the runtime `IN` values it
    /// prompts for afterwards come from `interactive`.
    pub fn from_reader_with_interactive(reader: Box<dyn BufRead>, interactive: Box<dyn BufRead>) -> Self {
        let mut bus = Bus::new(BusSource::File(reader), Box::new(io::stdout()));
        bus.interactive_fallback = Some(interactive);
        bus
    }

    /// Switch back to the interactive source. Called automatically on file
    /// EOF, and exposed so a caller can force it. Uses the fallback reader
    /// set by `from_reader_with_interactive`, or real stdin otherwise.
    pub fn reset_to_interactive(&mut self) {
        let reader = self
            .interactive_fallback
            .take()
            .unwrap_or_else(|| Box::new(io::BufReader::new(io::stdin())) as Box<dyn BufRead>);
        self.source = BusSource::Interactive(reader);
        self.pending.clear();
    }

    /// Read one byte off the bus into `self.buffer`, returning it.
    ///
    /// File sources yield one raw byte per call. Interactive sources print
    /// the prompt, then read and hex-parse whitespace-delimited tokens; a
    /// malformed token triggers a one-line warning and an automatic retry.
    /// EOF on a file source falls back to the interactive source and
    /// retries; EOF on the interactive source returns `Ok(None)`, which the
    /// caller treats as "turn the machine off".
    pub fn bus_input(&mut self) -> Result<Option<u8>, LmcError> {
        loop {
            match &mut self.source {
                BusSource::File(reader) => {
                    let mut byte = [0u8; 1];
                    match reader.read(&mut byte)? {
                        1 => {
                            self.buffer = byte[0];
                            return Ok(Some(self.buffer));
                        }
                        _ => self.reset_to_interactive(),
                    }
                }
                BusSource::Interactive(_) => {
                    if let Some(token) = self.pending.pop_front() {
                        match u8::from_str_radix(&token, 16) {
                            Ok(value) if token.len() <= 2 => {
                                self.buffer = value;
                                return Ok(Some(self.buffer));
                            }
                            _ => {
                                writeln!(self.output, "Not a hexadecimal value: '{}'", token)?;
                                continue;
                            }
                        }
                    }
                    write!(self.output, "{}", self.prompt)?;
                    self.output.flush()?;
                    let mut line = String::new();
                    let BusSource::Interactive(reader) = &mut self.source else {
                        unreachable!()
                    };
                    let n = reader.read_line(&mut line)?;
                    if n == 0 {
                        return Ok(None);
                    }
                    self.pending.extend(line.split_whitespace().map(String::from));
                    if self.pending.is_empty() {
                        continue; // blank line, re-prompt
                    }
                }
            }
        }
    }

    /// Write `value` to the bus output as two lowercase hex digits, no
    /// separator.
    pub fn bus_output(&mut self, value: u8) -> Result<(), LmcError> {
        write!(self.output, "{:02x}", value)?;
        self.output.flush()?;
        Ok(())
    }

    /// Replace the output sink, e.g. to capture it in a test.
    pub fn set_output(&mut self, output: Box<dyn Write>) {
        self.output = output;
    }

    /// Write a line of debugger text (dumps, diagnostics) straight to the
    /// output sink, bypassing the two-hex-digit `bus_output` framing.
    pub fn write_line(&mut self, text: &str) -> Result<(), LmcError> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }
}
