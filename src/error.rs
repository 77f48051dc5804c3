//! Error types for the compiler and the virtual machine.
//!
//! Neither type reaches for an external error crate: both implement
//! [`std::error::Error`] and [`std::fmt::Display`] by hand, in the spirit of
//! the small, purpose-built error enums the rest of this codebase favours.

use std::fmt;
use std::io;

/// Failures that can occur while compiling a source file.
#[derive(Debug)]
pub enum CompileError {
    /// `source:line: syntax error: 'token'`
    Syntax { line: usize, token: String },
    /// More than 254 instruction bytes were emitted.
    ArrayFull,
    /// Underlying file I/O failed.
    Io(io::Error),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax { line, token } => {
                write!(f, "{}: syntax error: '{}'", line, token)
            }
            CompileError::ArrayFull => write!(f, "program exceeds 254 instruction bytes"),
            CompileError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CompileError {
    fn from(e: io::Error) -> Self {
        CompileError::Io(e)
    }
}

/// Failures that can occur while loading or running a program.
#[derive(Debug)]
pub enum LmcError {
    /// A `STORE` or `IN` targeted an address below `0x20`.
    RomWrite { address: u8 },
    /// A bootstrap declared more than 32 bytes of body.
    BootstrapTooLarge { declared: usize },
    /// A bootstrap file is missing its size byte.
    BootstrapMissingSize,
    /// A bootstrap's declared size does not match the bytes actually read.
    BootstrapSizeMismatch { declared: usize, read: usize },
    /// Underlying file I/O failed.
    Io(io::Error),
}

impl fmt::Display for LmcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LmcError::RomWrite { address } => write!(f, "{:02x}: read only", address),
            LmcError::BootstrapTooLarge { declared } => {
                write!(f, "bootstrap too large: {} bytes (max 32)", declared)
            }
            LmcError::BootstrapMissingSize => write!(f, "bootstrap is missing its size byte"),
            LmcError::BootstrapSizeMismatch { declared, read } => write!(
                f,
                "bootstrap declared {} bytes but only {} were read",
                declared, read
            ),
            LmcError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LmcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LmcError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LmcError {
    fn from(e: io::Error) -> Self {
        LmcError::Io(e)
    }
}
