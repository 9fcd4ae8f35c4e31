use std::path::Path;

use serde::Serialize;
use tera::Context;

use crate::config::DeviceKey;
use crate::table::ResolvedParam;
use crate::{Result, TEMPLATES};

#[derive(Debug, Clone, Serialize)]
struct ScalaParam {
    name: String,
    unit: &'static str,
    scala_type: &'static str,
    value: String,
}

/// Renders the generated Scala source consumed by the SpinalHDL build.
///
/// Cycle-count and picosecond parameters render as `Double`, plain integers
/// as `Int`; values print exactly as recorded in the table.
pub fn generate_device_parameters(key: DeviceKey, parameters: &[ResolvedParam]) -> Result<String> {
    let rows: Vec<ScalaParam> = parameters
        .iter()
        .map(|p| ScalaParam {
            name: p.name.clone(),
            unit: p.unit.token(),
            scala_type: if p.unit.is_real() { "Double" } else { "Int" },
            value: p.value.to_string(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("density", key.density.token());
    context.insert("speed_grade", key.speed_grade.token());
    context.insert("width", key.width.token());
    context.insert("rank", key.rank.token());
    context.insert("parameters", &rows);
    Ok(TEMPLATES.render("device_parameters.scala", &context)?)
}

pub fn save_device_parameters(
    path: impl AsRef<Path>,
    key: DeviceKey,
    parameters: &[ResolvedParam],
) -> Result<()> {
    let scala = generate_device_parameters(key, parameters)?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, scala)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Density, Rank, SpeedGrade, Width};
    use crate::scan::Unit;
    use crate::table::ParamValue;

    #[test]
    fn test_generate_device_parameters() {
        let key = DeviceKey {
            density: Density::Den1024Mb,
            speed_grade: SpeedGrade::Sg15,
            width: Width::X8,
            rank: Rank::Single,
        };
        let parameters = vec![
            ResolvedParam {
                name: "BL".to_string(),
                unit: Unit::Int,
                value: ParamValue::Int(8),
            },
            ResolvedParam {
                name: "CL".to_string(),
                unit: Unit::Tck,
                value: ParamValue::Real(11.0),
            },
            ResolvedParam {
                name: "tRFC".to_string(),
                unit: Unit::Ps,
                value: ParamValue::Real(350.0),
            },
        ];
        let scala = generate_device_parameters(key, &parameters).unwrap();
        assert!(scala.contains("val density = \"den1024Mb\""));
        assert!(scala.contains("val speedGrade = \"sg15\""));
        assert!(scala.contains("val width = \"x8\""));
        assert!(scala.contains("val rank = \"SINGLE_RANK\""));
        assert!(scala.contains("val BL: Int = 8 // Int"));
        assert!(scala.contains("val CL: Double = 11.0 // tCK"));
        assert!(scala.contains("val tRFC: Double = 350.0 // ps"));
    }
}
