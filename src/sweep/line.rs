use lazy_static::lazy_static;
use regex::Regex;

/// One line of simulator standard output, classified.
///
/// The raw value is left unconverted; only the parameter's unit, known to the
/// caller, decides between integer and floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// `NAME VALUE`.
    Value { name: &'a str, raw: &'a str },
    /// Whitespace only.
    Blank,
    /// Anything else.
    Malformed,
}

lazy_static! {
    static ref VALUE_RE: Regex =
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s+([0-9]+(?:\.[0-9]+)?)\s*$").unwrap();
}

pub fn parse_line(line: &str) -> ParsedLine<'_> {
    if line.trim().is_empty() {
        return ParsedLine::Blank;
    }
    match VALUE_RE.captures(line) {
        Some(caps) => {
            // Groups 1 and 2 are non-optional in the pattern.
            let name = caps.get(1).unwrap().as_str();
            let raw = caps.get(2).unwrap().as_str();
            ParsedLine::Value { name, raw }
        }
        None => ParsedLine::Malformed,
    }
}
