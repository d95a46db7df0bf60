use std::path::PathBuf;

use clap::{builder::{PossibleValuesParser, TypedValueParser}, value_parser, Parser};
use trackstat_core::{AnalysisConfig, UnitSystem};

/// Returns the parsed command line options. Uses the 'wild' crate to do glob
/// expansion on Windows. so that Windows and Linux behave identically.
pub fn parse_args() -> Args {
    Args::parse_from(wild::args())
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(
        long,
        default_value = "5",
        help = "Measure pace over this many points, to smooth out GPS jitter",
        value_parser = value_parser!(u16).range(1..=1000)
    )]
    pub pace_interval: u16,

    #[arg(
        long = "outlier-z",
        default_value = "1.0",
        help = "Paces whose z-score is at least this far from zero are smoothed"
    )]
    pub outlier_z: f64,

    #[arg(
        short,
        long,
        default_value = "metric",
        help = "Report splits in km (metric) or miles (imperial)",
        value_parser = PossibleValuesParser::new(["metric", "imperial"])
            .try_map(|s| s.parse::<UnitSystem>())
    )]
    pub units: UnitSystem,

    #[arg(
        short,
        long,
        help = "Split unit, 'km' or 'mile'. Overrides the unit implied by '--units'"
    )]
    pub split_unit: Option<String>,

    #[arg(
        long,
        default_value = "10000",
        help = "Maximum number of FIT samples to hold while waiting for a GPS fix"
    )]
    pub backfill_limit: usize,

    #[arg(
        long,
        default_value = "false",
        help = "Keep points whose timestamp repeats the previous point's"
    )]
    pub keep_duplicate_times: bool,

    #[arg(help = "List of GPX or FIT files to analyse")]
    pub files: Vec<PathBuf>,
}

impl Args {
    /// The analysis parameters chosen on the command line.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            pace_interval: self.pace_interval as usize,
            outlier_z_threshold: self.outlier_z,
            unit_system: self.units,
            backfill_limit: self.backfill_limit,
            drop_duplicate_times: !self.keep_duplicate_times,
        }
    }

    /// The name of the split unit to report in. An explicit '--split-unit'
    /// is passed through unchecked so the analyzer can reject it.
    pub fn split_unit_name(&self) -> String {
        match &self.split_unit {
            Some(name) => name.clone(),
            None => self.analysis_config().unit_system.split_unit().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use trackstat_core::SplitUnit;

    use super::*;

    #[test]
    fn defaults_match_the_library() {
        let args = Args::parse_from(["trackstat", "run.gpx"]);
        assert_eq!(args.analysis_config(), AnalysisConfig::default());
        assert_eq!(args.split_unit_name(), SplitUnit::Km.to_string());
        assert_eq!(args.files, vec![PathBuf::from("run.gpx")]);
    }

    #[test]
    fn imperial_means_miles() {
        let args = Args::parse_from(["trackstat", "--units", "imperial", "--keep-duplicate-times"]);
        let config = args.analysis_config();
        assert_eq!(config.unit_system, UnitSystem::Imperial);
        assert!(!config.drop_duplicate_times);
        assert_eq!(args.split_unit_name(), "mile");
    }

    #[test]
    fn explicit_split_unit_wins() {
        let args = Args::parse_from(["trackstat", "--units", "imperial", "--split-unit", "km"]);
        assert_eq!(args.split_unit_name(), "km");
    }

    #[test]
    fn unknown_unit_systems_are_rejected() {
        assert!(Args::try_parse_from(["trackstat", "--units", "nautical"]).is_err());
    }

    #[test]
    fn zero_pace_interval_is_rejected() {
        assert!(Args::try_parse_from(["trackstat", "--pace-interval", "0"]).is_err());
    }
}
