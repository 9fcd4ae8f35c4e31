use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use derive_builder::Builder;
use itertools::iproduct;
use log::{debug, info, warn};

use crate::config::{Density, DeviceKey, Rank, SpeedGrade, ToolConfig, Width};
use crate::scan::Unit;
use crate::table::ParamTable;
use crate::Result;

pub mod line;

use line::{parse_line, ParsedLine};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Inputs for one full sweep of a density's configuration space.
#[derive(Debug, Clone, Builder)]
pub struct SweepParams {
    /// Density whose configurations are swept.
    pub density: Density,
    /// Rendered testbench source.
    #[builder(setter(into))]
    pub testbench: PathBuf,
    /// Directory for compiled simulations and per-run output logs.
    #[builder(setter(into))]
    pub work_dir: PathBuf,
    /// Commands, model directory and per-run deadline.
    pub tools: ToolConfig,
}

/// Runs the simulator over the full speed grade x width x rank cross product
/// for the sweep's density and merges every run's output into one table.
///
/// Runs are strictly sequential; keys are ordered, so the merged table does
/// not depend on sweep order.
pub fn run_sweep(params: &SweepParams, units: &BTreeMap<String, Unit>) -> Result<ParamTable> {
    let mut table = ParamTable::new(units.clone());
    for (speed_grade, width, rank) in iproduct!(SpeedGrade::ALL, Width::ALL, Rank::ALL) {
        let key = DeviceKey {
            density: params.density,
            speed_grade,
            width,
            rank,
        };
        debug!("simulating {key}");
        let output = run_simulator(params, key)?;
        merge_output(&mut table, key, &output)?;
    }
    info!(
        "resolved {} parameters across {} configurations",
        table.len(),
        SpeedGrade::ALL.len() * Width::ALL.len() * Rank::ALL.len()
    );
    Ok(table)
}

/// Folds one simulation's stdout into the table. Malformed lines and names
/// absent from the scanned header abort the sweep.
pub fn merge_output(table: &mut ParamTable, key: DeviceKey, output: &str) -> Result<()> {
    for line in output.lines() {
        match parse_line(line) {
            ParsedLine::Value { name, raw } => table
                .record(key, name, raw)
                .with_context(|| format!("offending line for {key}: '{line}'"))?,
            ParsedLine::Blank => {}
            ParsedLine::Malformed => {
                bail!("malformed simulator output for {key}: '{line}'")
            }
        }
    }
    Ok(())
}

/// Compiles and runs the simulator for one configuration, returning its
/// captured standard output.
fn run_simulator(params: &SweepParams, key: DeviceKey) -> Result<String> {
    let tools = &params.tools;
    let sim_path = params.work_dir.join(key.slug());
    let out_path = sim_path.with_extension("out");

    let status = Command::new(&tools.compile)
        .arg("-I")
        .arg(&tools.model_dir)
        .arg("-D")
        .arg(key.density.token())
        .arg("-D")
        .arg(key.speed_grade.token())
        .arg("-D")
        .arg(key.width.token())
        .arg("-D")
        .arg(key.rank.token())
        .arg(&params.testbench)
        .arg("-o")
        .arg(&sim_path)
        .current_dir(&params.work_dir)
        .status()
        .with_context(|| format!("failed to launch {}", tools.compile))?;
    if !status.success() {
        bail!("{} exited unsuccessfully for {key}", tools.compile);
    }

    run_simulation(tools, &params.work_dir, &sim_path, &out_path, key)?;

    fs::read_to_string(&out_path)
        .with_context(|| format!("failed to read simulator output {out_path:?}"))
}

/// Executes one compiled simulation with stdout redirected to `out_path`.
///
/// A run that outlives the configured deadline is killed and retried once;
/// a second expiry aborts the sweep.
fn run_simulation(
    tools: &ToolConfig,
    work_dir: &Path,
    sim_path: &Path,
    out_path: &Path,
    key: DeviceKey,
) -> Result<()> {
    let deadline = Duration::from_secs(tools.sim_timeout_secs);
    for attempt in 1..=2 {
        let out_file = fs::File::create(out_path)?;
        let err_file = fs::File::create(out_path.with_extension("err"))?;

        let mut child = Command::new(&tools.run)
            .arg(sim_path)
            .stdout(out_file)
            .stderr(err_file)
            .current_dir(work_dir)
            .spawn()
            .with_context(|| format!("failed to launch {}", tools.run))?;

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                if !status.success() {
                    bail!("{} exited unsuccessfully for {key}", tools.run);
                }
                return Ok(());
            }
            if start.elapsed() >= deadline {
                let _ = child.kill();
                child.wait()?;
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        warn!("simulation timed out for {key} (attempt {attempt})");
    }
    bail!("simulation timed out twice for {key}")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::table::ParamValue;

    fn key() -> DeviceKey {
        DeviceKey {
            density: Density::Den1024Mb,
            speed_grade: SpeedGrade::Sg15,
            width: Width::X8,
            rank: Rank::Single,
        }
    }

    fn units() -> BTreeMap<String, Unit> {
        BTreeMap::from([
            ("tRFC".to_string(), Unit::Ps),
            ("CL".to_string(), Unit::Tck),
        ])
    }

    #[test]
    fn test_merge_output() {
        let mut table = ParamTable::new(units());
        merge_output(&mut table, key(), "tRFC 350.0\n\nCL 11\n").unwrap();
        assert_eq!(
            table.get("tRFC").unwrap().values[&key()],
            ParamValue::Real(350.0)
        );
        assert_eq!(
            table.get("CL").unwrap().values[&key()],
            ParamValue::Real(11.0)
        );
    }

    #[test]
    fn test_merge_rejects_unknown_parameter() {
        let mut table = ParamTable::new(units());
        let err = merge_output(&mut table, key(), "tBOGUS 5\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("tBOGUS"), "{msg}");
        assert!(msg.contains("offending line"), "{msg}");
    }

    #[test]
    fn test_merge_rejects_malformed_line() {
        let mut table = ParamTable::new(units());
        let err = merge_output(&mut table, key(), "VCD info: dumpfile dump.vcd opened\n").unwrap_err();
        assert!(err.to_string().contains("malformed simulator output"));
    }
}
