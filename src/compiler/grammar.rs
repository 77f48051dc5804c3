//! Per-line grammar for the mnemonic assembly source: tokenising a line,
//! then matching one of three shapes — a `start` directive, a
//! `mnemonic [addr_mode] hex` instruction, or a bare `hex hex` raw pair.
//!
//! Hex-literal recognition is the one place this still reaches for `nom`
//! (`hex_digit1` bounded to one or two characters): everything else is a
//! complete, already-whitespace-delimited token, so there is no benefit to
//! running a combinator over a half-consumed line the way the rest of a
//! `nom` grammar would.

use nom::character::complete::hex_digit1;
use nom::combinator::{all_consuming, map_res, verify};
use nom::IResult;

use crate::error::CompileError;
use crate::instruction::{flags, keyword_of, opcode_of, OpCode};

use super::ProgramWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// `@`
    Address,
    /// `*@` or `*`
    Pointer,
    Hex(u8),
    Word(String),
}

fn hex_byte(input: &str) -> IResult<&str, u8> {
    map_res(verify(hex_digit1, |s: &str| s.len() <= 2), |s: &str| {
        u8::from_str_radix(s, 16)
    })(input)
}

fn classify(token: &str) -> Token {
    if token == "@" {
        Token::Address
    } else if token == "*@" || token == "*" {
        Token::Pointer
    } else if let Ok((_, value)) = all_consuming(hex_byte)(token) {
        Token::Hex(value)
    } else {
        Token::Word(token.to_string())
    }
}

/// Strip a trailing `// ...` or `# ...` comment from one line.
fn strip_comment(line: &str) -> &str {
    match line.find("//").or_else(|| line.find('#')) {
        Some(i) => &line[..i],
        None => line,
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Address => "@".to_string(),
        Token::Pointer => "*@".to_string(),
        Token::Hex(v) => format!("{:02x}", v),
        Token::Word(w) => w.clone(),
    }
}

fn syntax_error(line: usize, token: impl Into<String>) -> CompileError {
    CompileError::Syntax {
        line,
        token: token.into(),
    }
}

/// Parse the whole source, feeding every directive/instruction it contains
/// into `writer` in order. Blank lines and comment-only lines are skipped.
pub fn parse(source: &str, writer: &mut ProgramWriter) -> Result<(), CompileError> {
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let tokens: Vec<Token> = strip_comment(raw_line)
            .split_whitespace()
            .map(classify)
            .collect();
        if tokens.is_empty() {
            continue;
        }
        parse_line(line_no, &tokens, writer)?;
    }
    Ok(())
}

fn parse_line(line_no: usize, tokens: &[Token], writer: &mut ProgramWriter) -> Result<(), CompileError> {
    match tokens {
        [Token::Word(w), rest @ ..] if w.eq_ignore_ascii_case("start") => {
            parse_start(line_no, rest, writer)
        }
        [Token::Word(w), rest @ ..] => {
            let opcode = opcode_of(w).ok_or_else(|| syntax_error(line_no, w.clone()))?;
            parse_instruction(line_no, opcode, rest, writer)
        }
        [Token::Hex(code), Token::Hex(value)] => writer.append(*code, *value),
        [first, ..] => Err(syntax_error(line_no, describe(first))),
        [] => unreachable!("empty lines are filtered out before parse_line"),
    }
}

fn parse_start(line_no: usize, rest: &[Token], writer: &mut ProgramWriter) -> Result<(), CompileError> {
    match rest {
        [Token::Hex(v)] => {
            writer.set_entry_relative(*v);
            Ok(())
        }
        [Token::Address, Token::Hex(v)] => {
            writer.set_entry_absolute(*v);
            Ok(())
        }
        [first, ..] => Err(syntax_error(line_no, describe(first))),
        [] => Err(syntax_error(line_no, "start")),
    }
}

fn parse_instruction(
    line_no: usize,
    opcode: OpCode,
    rest: &[Token],
    writer: &mut ProgramWriter,
) -> Result<(), CompileError> {
    let (indirection, arg) = match rest {
        [Token::Hex(v)] => (0u8, *v),
        [Token::Address, Token::Hex(v)] => (flags::VAR, *v),
        [Token::Pointer, Token::Hex(v)] => (flags::VAR | flags::PTR, *v),
        [first, ..] => return Err(syntax_error(line_no, describe(first))),
        [] => return Err(syntax_error(line_no, keyword_of(opcode))),
    };
    writer.append(opcode.0 | indirection, arg)
}
