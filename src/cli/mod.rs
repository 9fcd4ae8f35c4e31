use std::fs::canonicalize;
use std::path::PathBuf;

use clap::Parser;

use crate::cli::args::Args;
use crate::cli::progress::StepContext;
use crate::config::{parse_tool_config, DeviceKey, ToolConfig};
use crate::plan::{execute_plan, generate_plan, ExecutePlanParams, TaskKey};
use crate::{Result, BUILD_PATH};

pub mod args;
pub mod progress;

pub const BANNER: &str = r"
     _     _      _____
  __| | __| |_ __|___ / __ _  ___ _ __
 / _` |/ _` | '__| |_ \/ _` |/ _ \ '_ \
| (_| | (_| | |  ___) | (_| |  __/ | | |
 \__,_|\__,_|_| |____/ \__, |\___|_| |_|
                       |___/
ddr3gen v0.1
";

pub fn run() -> Result<()> {
    let args = Args::parse();

    println!("{BANNER}");

    let tools = if let Some(config_path) = &args.config {
        let config_path = canonicalize(config_path)?;
        println!("Tool configuration file: {:?}", &config_path);
        parse_tool_config(&config_path)?
    } else {
        ToolConfig::default()
    };

    let key = DeviceKey {
        density: args.density,
        speed_grade: args.speed_grade,
        width: args.width,
        rank: args.rank,
    };

    println!("Requested configuration:");
    println!("\tDensity: {}", key.density);
    println!("\tSpeed grade: {}", key.speed_grade);
    println!("\tWidth: {}", key.width);
    println!("\tRank: {}", key.rank);

    let mut ctx = StepContext::new();

    let plan = ctx.check(generate_plan(key, tools))?;
    ctx.finish(TaskKey::GeneratePlan);

    let work_dir = if let Some(output_dir) = args.output_dir {
        output_dir
    } else {
        PathBuf::from(BUILD_PATH)
    };
    std::fs::create_dir_all(&work_dir)?;
    let work_dir = canonicalize(work_dir)?;

    let res = execute_plan(ExecutePlanParams {
        work_dir: &work_dir,
        plan: &plan,
        ctx: Some(&mut ctx),
    });

    ctx.check(res)?;
    println!("Artifacts saved to: {:?}\n", &work_dir);

    Ok(())
}
