//! The mnemonic ⟷ opcode lookup.
//!
//! This table is process-wide and immutable: a fixed array of (keyword,
//! opcode) pairs built once into a [`std::sync::OnceLock`] map, rather than
//! populated at runtime through a hashtable API the way the C original does
//! (`hcreate`/`hsearch`). Twenty-two entries do not need a crate of their
//! own; a linear scan over the same array backs the reverse lookup.

use super::OpCode;
use std::collections::HashMap;
use std::sync::OnceLock;

/// `(keyword, opcode byte)`, case folded to lowercase at lookup time.
const KEYWORDS: &[(&str, u8)] = &[
    ("add", OpCode::ADD.0),
    ("sub", OpCode::SUB.0),
    ("nand", OpCode::NAND.0),
    ("load", OpCode::LOAD.0),
    ("store", OpCode::STORE.0),
    ("in", OpCode::IN.0),
    ("out", OpCode::OUT.0),
    ("jump", OpCode::JUMP.0),
    ("brn", OpCode::BRN.0),
    ("brz", OpCode::BRZ.0),
    ("stop", OpCode::HLT.0),
    ("start", OpCode::START.0),
    ("debug", OpCode::DEBUG.0),
    ("break", OpCode::BREAK.0),
    ("free", OpCode::FREE.0),
    ("continue", OpCode::CONT.0),
    ("next", OpCode::NEXT.0),
    ("print", OpCode::PRINT.0),
    ("dump", OpCode::DUMP.0),
    ("clear", OpCode::CLEAR.0),
];

static LOOKUP: OnceLock<HashMap<&'static str, u8>> = OnceLock::new();

fn lookup() -> &'static HashMap<&'static str, u8> {
    LOOKUP.get_or_init(|| KEYWORDS.iter().copied().collect())
}

/// Translate a source keyword to an [`OpCode`]. Case-insensitive. Returns
/// `None` for the empty string or any token outside the keyword table —
/// callers decide whether that is a raw hex byte or a syntax error.
pub fn opcode_of(keyword: &str) -> Option<OpCode> {
    if keyword.is_empty() {
        return None;
    }
    let lower = keyword.to_ascii_lowercase();
    lookup().get(lower.as_str()).copied().map(OpCode)
}

/// Reverse translate an opcode to its canonical keyword, or `""` if the byte
/// has no exact mnemonic (e.g. it carries indirection bits, or is not a
/// recognised operation at all).
pub fn keyword_of(opcode: OpCode) -> &'static str {
    KEYWORDS
        .iter()
        .find(|(_, byte)| *byte == opcode.0)
        .map(|(kw, _)| *kw)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_keyword() {
        for &(kw, byte) in KEYWORDS {
            assert_eq!(opcode_of(kw), Some(OpCode(byte)), "keyword {}", kw);
            assert_eq!(keyword_of(OpCode(byte)), kw, "opcode {:#04x}", byte);
        }
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(opcode_of("ADD"), opcode_of("add"));
        assert_eq!(opcode_of("Jump"), Some(OpCode::JUMP));
    }

    #[test]
    fn unknown_and_empty_tokens_return_none() {
        assert_eq!(opcode_of(""), None);
        assert_eq!(opcode_of("frobnicate"), None);
    }

    #[test]
    fn opcode_with_indirection_has_no_exact_keyword() {
        assert_eq!(keyword_of(OpCode(OpCode::STORE.0 | 0x40)), "");
    }
}
