use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{Result, LIB_PATH};

/// Memory chip capacity variant. Selects which vendor timing header applies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Density {
    #[value(name = "den1024Mb")]
    Den1024Mb,
    #[value(name = "den2048Mb")]
    Den2048Mb,
    #[value(name = "den4096Mb")]
    Den4096Mb,
    #[value(name = "den8192Mb")]
    Den8192Mb,
}

impl Density {
    pub const ALL: [Density; 4] = [
        Density::Den1024Mb,
        Density::Den2048Mb,
        Density::Den4096Mb,
        Density::Den8192Mb,
    ];

    /// The preprocessor define understood by the vendor model.
    pub fn token(&self) -> &'static str {
        match self {
            Density::Den1024Mb => "den1024Mb",
            Density::Den2048Mb => "den2048Mb",
            Density::Den4096Mb => "den4096Mb",
            Density::Den8192Mb => "den8192Mb",
        }
    }

    /// File name of this density's timing header within the model directory.
    pub fn header_file(&self) -> &'static str {
        match self {
            Density::Den1024Mb => "1024Mb_ddr3_parameters.vh",
            Density::Den2048Mb => "2048Mb_ddr3_parameters.vh",
            Density::Den4096Mb => "4096Mb_ddr3_parameters.vh",
            Density::Den8192Mb => "8192Mb_ddr3_parameters.vh",
        }
    }
}

/// DDR3 timing/performance bin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum SpeedGrade {
    #[value(name = "sg093")]
    Sg093,
    #[value(name = "sg107")]
    Sg107,
    #[value(name = "sg125")]
    Sg125,
    #[value(name = "sg15")]
    Sg15,
    #[value(name = "sg15E")]
    Sg15E,
    #[value(name = "sg187")]
    Sg187,
    #[value(name = "sg187E")]
    Sg187E,
    #[value(name = "sg25")]
    Sg25,
    #[value(name = "sg25E")]
    Sg25E,
}

impl SpeedGrade {
    pub const ALL: [SpeedGrade; 9] = [
        SpeedGrade::Sg093,
        SpeedGrade::Sg107,
        SpeedGrade::Sg125,
        SpeedGrade::Sg15,
        SpeedGrade::Sg15E,
        SpeedGrade::Sg187,
        SpeedGrade::Sg187E,
        SpeedGrade::Sg25,
        SpeedGrade::Sg25E,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            SpeedGrade::Sg093 => "sg093",
            SpeedGrade::Sg107 => "sg107",
            SpeedGrade::Sg125 => "sg125",
            SpeedGrade::Sg15 => "sg15",
            SpeedGrade::Sg15E => "sg15E",
            SpeedGrade::Sg187 => "sg187",
            SpeedGrade::Sg187E => "sg187E",
            SpeedGrade::Sg25 => "sg25",
            SpeedGrade::Sg25E => "sg25E",
        }
    }
}

/// Data interface width.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Width {
    #[value(name = "x4")]
    X4,
    #[value(name = "x8")]
    X8,
    #[value(name = "x16")]
    X16,
}

impl Width {
    pub const ALL: [Width; 3] = [Width::X4, Width::X8, Width::X16];

    pub fn token(&self) -> &'static str {
        match self {
            Width::X4 => "x4",
            Width::X8 => "x8",
            Width::X16 => "x16",
        }
    }
}

/// Rank configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Rank {
    #[value(name = "SINGLE_RANK")]
    Single,
    #[value(name = "DUAL_RANK")]
    Dual,
    #[value(name = "QUAD_RANK")]
    Quad,
}

impl Rank {
    pub const ALL: [Rank; 3] = [Rank::Single, Rank::Dual, Rank::Quad];

    pub fn token(&self) -> &'static str {
        match self {
            Rank::Single => "SINGLE_RANK",
            Rank::Dual => "DUAL_RANK",
            Rank::Quad => "QUAD_RANK",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl fmt::Display for SpeedGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The four dimensions that select one column of the parameter table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceKey {
    pub density: Density,
    pub speed_grade: SpeedGrade,
    pub width: Width,
    pub rank: Rank,
}

impl DeviceKey {
    /// Underscore-joined form, used for per-configuration file names.
    pub fn slug(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.density, self.speed_grade, self.width, self.rank
        )
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.density, self.speed_grade, self.width, self.rank
        )
    }
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(LIB_PATH)
}

fn default_compile() -> String {
    "iverilog".to_string()
}

fn default_run() -> String {
    "vvp".to_string()
}

fn default_sim_timeout_secs() -> u64 {
    300
}

/// Tool configuration, read from a TOML file or defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Directory containing the vendor Verilog model and its timing headers.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    /// Command that compiles the testbench against the model.
    #[serde(default = "default_compile")]
    pub compile: String,
    /// Command that executes a compiled simulation.
    #[serde(default = "default_run")]
    pub run: String,
    /// Per-run deadline. An expired run is retried once, then the sweep aborts.
    #[serde(default = "default_sim_timeout_secs")]
    pub sim_timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            compile: default_compile(),
            run: default_run(),
            sim_timeout_secs: default_sim_timeout_secs(),
        }
    }
}

impl ToolConfig {
    pub fn header_path(&self, density: Density) -> PathBuf {
        self.model_dir.join(density.header_file())
    }
}

pub fn parse_tool_config(path: impl AsRef<Path>) -> Result<ToolConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tool configuration {path:?}"))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse tool configuration {path:?}"))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for density in Density::ALL {
            assert_eq!(Density::from_str(density.token(), false), Ok(density));
        }
        for sg in SpeedGrade::ALL {
            assert_eq!(SpeedGrade::from_str(sg.token(), false), Ok(sg));
        }
        for width in Width::ALL {
            assert_eq!(Width::from_str(width.token(), false), Ok(width));
        }
        for rank in Rank::ALL {
            assert_eq!(Rank::from_str(rank.token(), false), Ok(rank));
        }
    }

    #[test]
    fn test_invalid_tokens_rejected() {
        assert!(Density::from_str("den99Mb", false).is_err());
        assert!(SpeedGrade::from_str("sg11", false).is_err());
        assert!(Width::from_str("x32", false).is_err());
        assert!(Rank::from_str("OCTO_RANK", false).is_err());
    }

    #[test]
    fn test_header_files() {
        assert_eq!(
            Density::Den1024Mb.header_file(),
            "1024Mb_ddr3_parameters.vh"
        );
        assert_eq!(
            Density::Den8192Mb.header_file(),
            "8192Mb_ddr3_parameters.vh"
        );
    }

    #[test]
    fn test_tool_config_defaults() {
        let config: ToolConfig = toml::from_str("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.compile, "iverilog");
        assert_eq!(config.run, "vvp");
        assert_eq!(config.sim_timeout_secs, 300);
    }

    #[test]
    fn test_tool_config_overrides() {
        let config: ToolConfig = toml::from_str(
            r#"
            model_dir = "/opt/models/ddr3"
            sim_timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/opt/models/ddr3"));
        assert_eq!(config.sim_timeout_secs, 10);
        assert_eq!(config.run, "vvp");
        assert_eq!(
            config.header_path(Density::Den2048Mb),
            PathBuf::from("/opt/models/ddr3/2048Mb_ddr3_parameters.vh")
        );
    }

    #[test]
    fn test_key_slug() {
        let key = DeviceKey {
            density: Density::Den1024Mb,
            speed_grade: SpeedGrade::Sg15,
            width: Width::X8,
            rank: Rank::Single,
        };
        assert_eq!(key.slug(), "den1024Mb_sg15_x8_SINGLE_RANK");
        assert_eq!(key.to_string(), "(den1024Mb, sg15, x8, SINGLE_RANK)");
    }
}
