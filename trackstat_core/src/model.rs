use core::fmt;

use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::geo_math::{Lat, Lon};

/// A point as read from a source file, before any enrichment. Positions
/// may be missing while a binary stream is being decoded, but every point
/// handed out by a source has them filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPoint {
    /// Position of the point within its source, strictly increasing.
    pub point_no: u32,
    /// Zero-based index of the track the point came from.
    pub track_no: u32,
    /// Zero-based index of the segment within its track.
    pub segment_no: u32,
    pub latitude: Option<Lat>,
    pub longitude: Option<Lon>,
    /// Elevation in metres.
    pub elevation: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
    /// Beats per minute.
    pub heart_rate: Option<u16>,
    pub cadence: Option<u16>,
}

impl RawPoint {
    /// Makes a point on track 0, segment 0 with no sensor data.
    pub fn new(point_no: u32, latitude: Lat, longitude: Lon, time: OffsetDateTime) -> Self {
        Self {
            point_no,
            track_no: 0,
            segment_no: 0,
            latitude: Some(latitude),
            longitude: Some(longitude),
            elevation: None,
            time: Some(time),
            heart_rate: None,
            cadence: None,
        }
    }
}

/// The closed set of activity types that we distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Run,
    Walk,
    Hike,
    #[default]
    Unknown,
}

impl ActivityType {
    /// Recognises our own names for activity types.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "run" => Some(ActivityType::Run),
            "walk" => Some(ActivityType::Walk),
            "hike" => Some(ActivityType::Hike),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityType::Run => write!(f, "run"),
            ActivityType::Walk => write!(f, "walk"),
            ActivityType::Hike => write!(f, "hike"),
            ActivityType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Information about the session as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    pub activity_type: ActivityType,
    /// The program that wrote the file, if the format records it.
    pub creator: Option<String>,
    /// Total distance as reported by the device, in metres.
    pub device_distance_m: Option<f64>,
    /// Total elapsed time as reported by the device.
    pub device_duration: Option<Duration>,
}

impl SessionMetadata {
    pub fn new(start_time: OffsetDateTime) -> Self {
        Self {
            name: None,
            description: None,
            start_time,
            activity_type: ActivityType::Unknown,
            creator: None,
            device_distance_m: None,
            device_duration: None,
        }
    }
}

/// Everything a source yields for one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedActivity {
    pub points: Vec<RawPoint>,
    pub metadata: SessionMetadata,
    /// Start times of the laps recorded by the device. Empty if the format
    /// has no laps.
    pub lap_starts: Vec<OffsetDateTime>,
}

/// A point of a PointSeries: the resolved raw point plus everything
/// derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPoint {
    pub point_no: u32,
    pub track_no: u32,
    pub segment_no: u32,
    pub latitude: Lat,
    pub longitude: Lon,
    pub elevation: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub heart_rate: Option<u16>,
    pub cadence: Option<u16>,

    /// Distance from the previous point, in metres. 0 for the first point.
    pub step_distance_m: f64,
    /// Distance from the start of the series, in metres.
    pub cumulative_distance_m: f64,
    pub km_bucket: u32,
    pub mile_bucket: u32,
    /// Seconds per km, after outlier correction.
    pub pace_per_km: Option<f64>,
    /// Seconds per mile.
    pub pace_per_mile: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub speed_mph: Option<f64>,
    pub elapsed_since_start: Duration,
}

impl TrackPoint {
    pub fn heart_rate_f64(&self) -> Option<f64> {
        self.heart_rate.map(f64::from)
    }

    pub fn cadence_f64(&self) -> Option<f64> {
        self.cadence.map(f64::from)
    }
}

/// A point interpolated to lie exactly on the boundary between two splits.
/// It was never recorded by the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitMarker {
    /// The bucket that ends at this marker.
    pub ends: u32,
    /// The bucket that begins at this marker.
    pub begins: u32,
    pub latitude: Lat,
    pub longitude: Lon,
    pub elevation: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
    pub cumulative_distance_m: f64,
    /// How far between the two surrounding points the boundary lies. None
    /// when both points are at the same distance.
    pub portion: Option<f64>,
}

/// Aggregate statistics for one split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    pub bucket_id: u32,
    /// Seconds per unit of the split.
    pub mean_pace: Option<f64>,
    pub mean_heart_rate: Option<f64>,
    pub mean_cadence: Option<f64>,
    pub mean_elevation: Option<f64>,
    pub duration: Duration,
}

/// Aggregate statistics for one lap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapSummary {
    /// 1-based, in the order the laps were supplied.
    pub lap_no: u32,
    /// When the device says the lap started.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// Up to the next lap start. The first lap is measured from the start
    /// of the series instead of its own `start_time`, so that the laps
    /// always add up to the whole activity.
    pub duration: Duration,
    /// Measured the same way as `duration`.
    pub distance_m: f64,
    pub mean_heart_rate: Option<f64>,
    pub mean_cadence: Option<f64>,
    pub mean_speed_kmh: Option<f64>,
}
