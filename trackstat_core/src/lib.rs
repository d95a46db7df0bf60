//! Reads GPS activity recordings (GPX and FIT) and works out distance,
//! pace, split and lap statistics from them.

pub mod config;
pub mod error;
pub mod geo_math;
pub mod gpx_model;
pub mod laps;
pub mod model;
pub mod outlier;
pub mod read;
pub mod series;
pub mod source;
pub mod splits;
pub mod summary;
pub mod units;

pub use config::AnalysisConfig;
pub use error::{Error, Result, SourceFormat};
pub use laps::{summarize_laps, LapAggregator};
pub use model::{
    ActivityType, LapSummary, ParsedActivity, RawPoint, SessionMetadata, SplitMarker,
    SplitSummary, TrackPoint,
};
pub use series::{PointSeries, PointSeriesBuilder};
pub use source::{parse_activity_file, source_for, RawPointSource};
pub use splits::{get_split_markers, get_split_summary, split_markers, split_summary};
pub use summary::{summarize, ActivitySummary};
pub use units::{SplitUnit, UnitSystem};
