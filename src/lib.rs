use lazy_static::lazy_static;
use tera::Tera;

pub use anyhow::{anyhow, Result};

pub mod cli;
pub mod config;
pub mod paths;
pub mod plan;
pub mod scan;
pub mod spinal;
pub mod sweep;
pub mod table;
pub mod verilog;

pub const BUILD_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/build");
pub const LIB_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/lib/DDR3_SDRAM_Verilog_Model");

lazy_static! {
    pub static ref TEMPLATES: Tera =
        match Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/*")) {
            Ok(t) => t,
            Err(e) => panic!("Error parsing templates: {e}"),
        };
}
