use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tera::Context;

use crate::scan::Unit;
use crate::{Result, TEMPLATES};

#[derive(Debug, Clone, Serialize)]
struct TbParam {
    name: String,
    format: &'static str,
}

/// Renders the testbench that includes the vendor timing header and reports
/// every scanned parameter as a `NAME VALUE` line.
///
/// Cycle-count and picosecond parameters display as reals; the vendor
/// headers declare fractional cycle counts (e.g. `TQH = 0.38`) that `%0d`
/// would truncate. `%0f` is used rather than `%0g` so large picosecond
/// values never render in exponent form.
pub fn generate_testbench(units: &BTreeMap<String, Unit>) -> Result<String> {
    let parameters: Vec<TbParam> = units
        .iter()
        .map(|(name, unit)| TbParam {
            name: name.clone(),
            format: if unit.is_real() { "%0f" } else { "%0d" },
        })
        .collect();
    let mut context = Context::new();
    context.insert("parameters", &parameters);
    Ok(TEMPLATES.render("testbench.v", &context)?)
}

pub fn save_testbench(path: impl AsRef<Path>, units: &BTreeMap<String, Unit>) -> Result<()> {
    let testbench = generate_testbench(units)?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, testbench)?;

    Ok(())
}
