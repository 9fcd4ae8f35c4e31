use std::path::Path;

use anyhow::bail;
use log::info;

use crate::cli::progress::StepContext;
use crate::config::{DeviceKey, ToolConfig};
use crate::paths::{out_scala, out_testbench};
use crate::scan::scan_header;
use crate::spinal::save_device_parameters;
use crate::sweep::{run_sweep, SweepParamsBuilder};
use crate::verilog::save_testbench;
use crate::Result;

/// A concrete plan for one generated parameter file.
pub struct GenPlan {
    pub key: DeviceKey,
    pub tools: ToolConfig,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    GeneratePlan,
    ScanParameters,
    GenerateTestbench,
    RunSweep,
    GenerateParams,
}

pub struct ExecutePlanParams<'a> {
    pub work_dir: &'a Path,
    pub plan: &'a GenPlan,
    pub ctx: Option<&'a mut StepContext>,
}

pub fn generate_plan(key: DeviceKey, tools: ToolConfig) -> Result<GenPlan> {
    let header = tools.header_path(key.density);
    if !header.is_file() {
        bail!("timing header {header:?} not found; set model_dir in the tool configuration");
    }
    Ok(GenPlan { key, tools })
}

macro_rules! try_finish_task {
    ( $ctx:expr, $task:expr ) => {
        if let Some(ctx) = $ctx.as_mut() {
            ctx.finish($task);
        }
    };
}

pub fn execute_plan(params: ExecutePlanParams) -> Result<()> {
    let ExecutePlanParams {
        work_dir,
        plan,
        mut ctx,
    } = params;

    std::fs::create_dir_all(work_dir)?;

    let key = plan.key;

    let units = scan_header(plan.tools.header_path(key.density))?;
    info!("scanned {} parameters for {}", units.len(), key.density);
    try_finish_task!(ctx, TaskKey::ScanParameters);

    let testbench_path = out_testbench(work_dir, "ddr3_parameter_resolution");
    save_testbench(&testbench_path, &units)?;
    try_finish_task!(ctx, TaskKey::GenerateTestbench);

    let sweep = SweepParamsBuilder::default()
        .density(key.density)
        .testbench(testbench_path)
        .work_dir(work_dir)
        .tools(plan.tools.clone())
        .build()?;
    let table = run_sweep(&sweep, &units)?;
    try_finish_task!(ctx, TaskKey::RunSweep);

    let parameters = table.filter(key)?;
    save_device_parameters(out_scala(work_dir, "device_parameters"), key, &parameters)?;
    try_finish_task!(ctx, TaskKey::GenerateParams);

    Ok(())
}
