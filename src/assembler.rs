//! The assembler: normalizes and tokenizes each line, looks it up in the
//! mnemonic dictionary, and falls back to the constant-load pattern for
//! everything else.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::SyntaxError;
use crate::float_bytes::float_to_bytes;
use crate::opcodes::opcode_table;
use crate::registers::GeneralRegister;

/// Strip everything from the first `#` onward, remove all whitespace, and
/// lowercase what remains — in that order (the order matters: a `#` inside
/// what would otherwise look like whitespace-separated tokens must still
/// start a comment).
fn normalize(line: &str) -> String {
    let without_comment = match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    };
    without_comment
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// The small "regex-shaped sidecar" for the six variable-width
/// constant-load forms: `new<t|r|y>=<signed decimal>`.
fn constant_load_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^new([try])=(-?\d+)(\.(\d+))?$").unwrap())
}

/// Try to parse `normalized` as a constant-load mnemonic. Returns the
/// opcode byte plus its inline immediate bytes, or `None` if it doesn't
/// match the pattern at all.
fn try_constant_load(normalized: &str) -> Option<Vec<u8>> {
    let caps = constant_load_pattern().captures(normalized)?;
    let reg = GeneralRegister::from_letter(caps[1].chars().next().unwrap())?;
    let has_dot = caps.get(3).is_some();

    // Parse the reconstructed decimal text directly as `f64` rather than
    // decomposing into an `i64` integer part plus a fractional remainder:
    // the integer part of a literal can exceed `i64`'s range (`f32` is
    // finite up to roughly 3.4e38) and a manual decomposition either
    // overflows or loses the sign on inputs like `-0.5`.
    let mut decimal_text = caps[2].to_string();
    if let Some(frac) = caps.get(4) {
        decimal_text.push('.');
        decimal_text.push_str(frac.as_str());
    }
    let value: f64 = decimal_text.parse().ok()?;

    // A literal with no dot that fits in a signed byte uses the
    // byte-constant opcode; everything else (including an in-range value
    // that merely *looks* like a float, e.g. `127.0`, or an integer literal
    // too large for a byte) uses the float-constant opcode. This is
    // intentional, not a missed optimization.
    let byte_opcode = match reg {
        GeneralRegister::T => 0u8,
        GeneralRegister::R => 1u8,
        GeneralRegister::Y => 2u8,
    };
    let float_opcode = byte_opcode + 3;

    let byte_value = caps[2].parse::<i64>().ok().filter(|n| (-128..=127).contains(n));

    if !has_dot {
        if let Some(int_part) = byte_value {
            let mut bytes = vec![byte_opcode];
            bytes.push(int_part as i8 as u8);
            return Some(bytes);
        }
    }

    let mut bytes = vec![float_opcode];
    bytes.extend_from_slice(&float_to_bytes(value as f32));
    Some(bytes)
}

/// Translate a full program into bytecode plus any syntax errors.
///
/// The program is always walked line by line so every bad line is
/// reported, but if any line produced an error the returned bytecode is
/// empty — a program with syntax errors never partially assembles.
pub fn translate(text: &str) -> (Vec<u8>, Vec<SyntaxError>) {
    let table = opcode_table();
    let mut bytes = Vec::new();
    let mut errors = Vec::new();

    for (index, raw_line) in text.split('\n').enumerate() {
        let normalized = normalize(raw_line);
        if normalized.is_empty() {
            continue;
        }

        if let Some(opcode) = table.lookup_mnemonic(&normalized) {
            bytes.push(opcode);
            continue;
        }

        if let Some(mut emitted) = try_constant_load(&normalized) {
            bytes.append(&mut emitted);
            continue;
        }

        errors.push(SyntaxError {
            line: index + 1,
            text: raw_line.to_string(),
        });
    }

    if !errors.is_empty() {
        bytes.clear();
    }

    (bytes, errors)
}
