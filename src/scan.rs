use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::Result;

/// Physical unit of a timing parameter, inferred from its trailing comment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Unit {
    /// Clock cycle count.
    Tck,
    /// Picoseconds.
    Ps,
    /// Plain integer.
    Int,
}

impl Unit {
    pub fn token(&self) -> &'static str {
        match self {
            Unit::Tck => "tCK",
            Unit::Ps => "ps",
            Unit::Int => "Int",
        }
    }

    /// Whether values of this unit resolve to floating point.
    pub fn is_real(&self) -> bool {
        !matches!(self, Unit::Int)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

lazy_static! {
    static ref DECL_RE: Regex =
        Regex::new(r"parameter\s+([A-Za-z_][A-Za-z0-9_]*)\s+[^\n]*//\s*([^\n]+)").unwrap();
}

/// Extracts every `parameter NAME ... // comment` declaration and classifies
/// its unit from the comment. A comment carrying both `tCK` and `ps` tokens
/// classifies as picoseconds, matching the vendor headers' convention of
/// quoting the tCK symbol inside picosecond descriptions.
pub fn scan_parameters(contents: &str) -> BTreeMap<String, Unit> {
    let mut parameters = BTreeMap::new();
    for caps in DECL_RE.captures_iter(contents) {
        let name = &caps[1];
        let comment = &caps[2];
        let mut unit = Unit::Int;
        if comment.split_whitespace().any(|word| word == "tCK") {
            unit = Unit::Tck;
        }
        if comment.split_whitespace().any(|word| word == "ps") {
            unit = Unit::Ps;
        }
        parameters.insert(name.to_string(), unit);
    }
    parameters
}

/// Scans a density's timing header. An empty result is treated as a
/// misconfiguration rather than silently producing an empty table.
pub fn scan_header(path: impl AsRef<Path>) -> Result<BTreeMap<String, Unit>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read timing header {path:?}"))?;
    let parameters = scan_parameters(&contents);
    if parameters.is_empty() {
        bail!("no parameter declarations found in {path:?}");
    }
    debug!("scanned {} parameters from {path:?}", parameters.len());
    Ok(parameters)
}
