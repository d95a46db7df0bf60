use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use args::{parse_args, Args};
use clap::builder::styling::AnsiColor;
use env_logger::Builder;
use log::{debug, error, info, warn};
use logging_timer::time;
use rayon::prelude::*;
use report::ActivityReport;
use trackstat_core::{
    get_split_markers, get_split_summary, parse_activity_file, summarize, summarize_laps,
    AnalysisConfig, PointSeriesBuilder,
};

mod args;
mod formatting;
mod report;

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

#[time]
fn main() -> Result<()> {
    configure_logging();
    info!("Starting {PROGRAM_NAME}");

    let args = parse_args();
    debug!("{:?}", &args);

    if args.files.is_empty() {
        warn!("No .gpx or .fit files specified, exiting");
        return Ok(());
    }

    let config = args.analysis_config();
    let split_unit = args.split_unit_name();

    // Every activity is independent, so they can all be done at once.
    let results: Vec<(&PathBuf, Result<ActivityReport>)> = args
        .files
        .par_iter()
        .map(|path| (path, analyse_file(path, &config, &split_unit)))
        .collect();

    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(report) => print!("{}", report.render()),
            Err(e) => {
                failures += 1;
                error!("{:?}: activity could not be imported: {e:#}", path);
            }
        }
    }

    info!(
        "Analysed {} of {} files",
        args.files.len() - failures,
        args.files.len()
    );

    Ok(())
}

/// Runs the whole pipeline for one file.
fn analyse_file(path: &Path, config: &AnalysisConfig, split_unit: &str) -> Result<ActivityReport> {
    let activity = parse_activity_file(path, config)?;
    let series = PointSeriesBuilder::new(config)
        .build(&activity.points)
        .context("the points could not be enriched")?;

    let splits = get_split_summary(&series, split_unit)?;
    let markers = get_split_markers(&series, split_unit)?;
    let laps = summarize_laps(&series, &activity.lap_starts)?;

    Ok(ActivityReport {
        path: path.to_owned(),
        metadata: activity.metadata,
        summary: summarize(&series),
        num_points: series.len(),
        split_unit: split_unit.to_owned(),
        splits,
        markers,
        laps,
    })
}

fn configure_logging() {
    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let level_style = buf.default_level_style(record.level());
        let level_style = match record.level() {
            log::Level::Error => level_style.fg_color(Some(AnsiColor::Red.into())),
            log::Level::Warn => level_style.fg_color(Some(AnsiColor::Yellow.into())),
            log::Level::Info => level_style.fg_color(Some(AnsiColor::Green.into())),
            log::Level::Debug => level_style.fg_color(Some(AnsiColor::Blue.into())),
            log::Level::Trace => level_style.fg_color(Some(AnsiColor::Magenta.into())),
        };

        let line_number_style = buf
            .default_level_style(record.level())
            .fg_color(Some(AnsiColor::Cyan.into()));

        match (record.file(), record.line()) {
            (Some(file), Some(line)) => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#} {}/{line_number_style}{}{line_number_style:#}] {}",
                buf.timestamp(),
                record.level(),
                file,
                line,
                record.args()
            ),
            (Some(file), None) => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#} {}] {}",
                buf.timestamp(),
                record.level(),
                file,
                record.args()
            ),
            _ => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#}] {}",
                buf.timestamp(),
                record.level(),
                record.args()
            ),
        }
    });

    builder.init();
}
