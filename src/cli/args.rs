use clap::Parser;
use std::path::PathBuf;

use crate::config::{Density, Rank, SpeedGrade, Width};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about,
    help_template(
        "{before-help}{name} {version}\n{author-with-newline}{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
    )
)]
pub struct Args {
    /// Memory density (selects the vendor timing header).
    #[arg(value_enum)]
    pub density: Density,

    /// Speed grade.
    #[arg(value_enum)]
    pub speed_grade: SpeedGrade,

    /// Data width.
    #[arg(value_enum)]
    pub width: Width,

    /// Rank configuration.
    #[arg(value_enum)]
    pub rank: Rank,

    /// Path to TOML tool configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to which output files should be saved.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_valid_configuration_parses() {
        let args =
            Args::try_parse_from(["ddr3gen", "den1024Mb", "sg15", "x8", "SINGLE_RANK"]).unwrap();
        assert_eq!(args.density, Density::Den1024Mb);
        assert_eq!(args.speed_grade, SpeedGrade::Sg15);
        assert_eq!(args.width, Width::X8);
        assert_eq!(args.rank, Rank::Single);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_invalid_density_rejected() {
        assert!(Args::try_parse_from(["ddr3gen", "den99Mb", "sg15", "x8", "SINGLE_RANK"]).is_err());
    }

    #[test]
    fn test_invalid_rank_rejected() {
        assert!(
            Args::try_parse_from(["ddr3gen", "den1024Mb", "sg15", "x8", "OCTO_RANK"]).is_err()
        );
    }

    #[test]
    fn test_missing_arguments_rejected() {
        assert!(Args::try_parse_from(["ddr3gen", "den1024Mb", "sg15"]).is_err());
    }
}
