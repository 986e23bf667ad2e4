//! Error types for translation and execution.

use thiserror::Error;

/// A single unrecognized line encountered while translating a program.
/// Translation keeps going after recording one of these so the full list
/// of bad lines can be reported at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown instruction ({text}) on line {}.", format_line_number(*line))]
pub struct SyntaxError {
    pub line: usize,
    pub text: String,
}

/// Fatal, run-time-only error: `run` refuses to execute bytecode at or
/// above the RAM-sized program limit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("program of {} bytes exceeds the {} byte limit", .size, .limit)]
    ProgramTooLarge { size: usize, limit: usize },
}

/// Render a line number with locale-appropriate (comma) digit grouping,
/// e.g. `1234` -> `"1,234"`. No crate in the example pool offers
/// locale-aware number formatting for a single call site, so this is a
/// small hand-rolled helper in the spirit of the teacher's own
/// self-contained `crc32` helper.
pub fn format_line_number(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers_are_unchanged() {
        assert_eq!(format_line_number(7), "7");
        assert_eq!(format_line_number(999), "999");
    }

    #[test]
    fn thousands_are_comma_grouped() {
        assert_eq!(format_line_number(1000), "1,000");
        assert_eq!(format_line_number(1234567), "1,234,567");
    }

    #[test]
    fn syntax_error_renders_with_grouped_line_number() {
        let err = SyntaxError {
            line: 1234,
            text: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown instruction (bogus) on line 1,234.");
    }
}
