use fitparser::{profile::MesgNum, FitDataRecord, Value};
use log::debug;
use logging_timer::time;
use time::{Duration, OffsetDateTime};

use crate::{
    config::AnalysisConfig,
    error::{Error, Result, SourceFormat},
    model::{ActivityType, ParsedActivity, SessionMetadata},
};

use super::{
    activity_types::{activity_type_from_sport, activity_type_from_sport_code},
    backfill::{BackfillQueue, DeviceSample},
    RawPointSource,
};

/// Positions are stored as 32-bit "semicircles".
const SEMICIRCLES_PER_DEGREE: f64 = 4_294_967_296.0 / 360.0;

/// Parses the FIT files written by fitness devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryDeviceSource;

impl RawPointSource for BinaryDeviceSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Binary
    }

    #[time]
    fn parse(&self, data: &[u8], config: &AnalysisConfig) -> Result<ParsedActivity> {
        let records = fitparser::from_bytes(data)
            .map_err(|e| Error::parse(SourceFormat::Binary, e.to_string()))?;
        debug!("Decoded {} FIT messages", records.len());
        activity_from_records(&records, config)
    }
}

/// Turns decoded FIT messages into an activity.
fn activity_from_records(
    records: &[FitDataRecord],
    config: &AnalysisConfig,
) -> Result<ParsedActivity> {
    let mut sessions = SessionFields::default();
    let mut lap_starts = Vec::new();
    let mut backfill = BackfillQueue::new(config.backfill_limit);

    for record in records {
        match record.kind() {
            MesgNum::Record => {
                if let Some(sample) = parse_sample(record)? {
                    backfill.push(sample);
                }
            }
            MesgNum::Lap => {
                if let Some(start) = find_timestamp(record, "start_time")? {
                    lap_starts.push(start);
                }
            }
            MesgNum::Session => sessions.update(record)?,
            _ => {}
        }
    }

    let points = backfill.finish();

    let start_time = sessions
        .start_time
        .or_else(|| points.first().and_then(|p| p.time))
        .ok_or_else(|| {
            Error::parse(
                SourceFormat::Binary,
                "no session start time and no samples with a timestamp",
            )
        })?;

    let mut metadata = SessionMetadata::new(start_time);
    metadata.activity_type = sessions.activity_type();
    metadata.device_distance_m = sessions.total_distance;
    metadata.device_duration = sessions.total_elapsed;

    debug!(
        "FIT activity: {} points, {} sessions, {} laps, type {}",
        points.len(),
        sessions.count,
        lap_starts.len(),
        metadata.activity_type
    );

    Ok(ParsedActivity {
        points,
        metadata,
        lap_starts,
    })
}

/// The 'session' messages of a file, combined. Multisport files have one
/// session per leg. The activity starts with the earliest session and its
/// totals are summed over all of them.
///
/// The sport is only known when every session agrees on it.
#[derive(Debug, Default)]
struct SessionFields {
    count: usize,
    start_time: Option<OffsetDateTime>,
    sport: Option<ActivityType>,
    total_distance: Option<f64>,
    total_elapsed: Option<Duration>,
}

impl SessionFields {
    fn update(&mut self, record: &FitDataRecord) -> Result<()> {
        let start_time = match find_timestamp(record, "start_time")? {
            Some(t) => Some(t),
            None => find_timestamp(record, "timestamp")?,
        };

        let mut sport = ActivityType::Unknown;
        let mut distance = None;
        let mut elapsed = None;

        for field in record.fields() {
            match field.name() {
                "sport" => {
                    sport = match field.value() {
                        Value::String(name) => activity_type_from_sport(name),
                        Value::Enum(code) | Value::UInt8(code) => {
                            activity_type_from_sport_code(*code)
                        }
                        _ => ActivityType::Unknown,
                    };
                }
                "total_distance" => distance = value_to_f64(field.value()),
                "total_elapsed_time" => {
                    elapsed = value_to_f64(field.value()).map(Duration::seconds_f64);
                }
                _ => {}
            }
        }

        self.count += 1;
        self.start_time = match (self.start_time, start_time) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.sport = match self.sport {
            None => Some(sport),
            Some(previous) if previous == sport => Some(sport),
            Some(_) => Some(ActivityType::Unknown),
        };
        self.total_distance = add_opt(self.total_distance, distance);
        self.total_elapsed = add_opt(self.total_elapsed, elapsed);

        Ok(())
    }

    fn activity_type(&self) -> ActivityType {
        self.sport.unwrap_or_default()
    }
}

/// Adds two optional totals. Missing values count as nothing, but two
/// missing values stay missing.
fn add_opt<T: std::ops::Add<Output = T>>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

/// Turns a 'record' message into a sample. Records without a timestamp or
/// an altitude are not samples we can use and give None.
fn parse_sample(record: &FitDataRecord) -> Result<Option<DeviceSample>> {
    let mut time = None;
    let mut latitude = None;
    let mut longitude = None;
    let mut elevation = None;
    let mut heart_rate = None;
    let mut cadence = None;

    for field in record.fields() {
        match field.name() {
            "timestamp" => time = timestamp_value(field.value())?,
            "position_lat" => {
                latitude = value_to_f64(field.value()).map(|v| v / SEMICIRCLES_PER_DEGREE);
            }
            "position_long" => {
                longitude = value_to_f64(field.value()).map(|v| v / SEMICIRCLES_PER_DEGREE);
            }
            // Prefer the enhanced field when both are present.
            "enhanced_altitude" => elevation = value_to_f64(field.value()),
            "altitude" => elevation = elevation.or(value_to_f64(field.value())),
            "heart_rate" => heart_rate = value_to_f64(field.value()).map(|v| v as u16),
            "cadence" => cadence = value_to_f64(field.value()).map(|v| v as u16),
            _ => {}
        }
    }

    match (time, elevation) {
        (Some(time), Some(elevation)) => Ok(Some(DeviceSample {
            latitude,
            longitude,
            elevation: Some(elevation),
            time,
            heart_rate,
            cadence,
        })),
        _ => Ok(None),
    }
}

fn find_timestamp(record: &FitDataRecord, name: &str) -> Result<Option<OffsetDateTime>> {
    match record.fields().iter().find(|f| f.name() == name) {
        Some(field) => timestamp_value(field.value()),
        None => Ok(None),
    }
}

/// FIT timestamps are UTC.
fn timestamp_value(value: &Value) -> Result<Option<OffsetDateTime>> {
    match value {
        Value::Timestamp(ts) => {
            let t = OffsetDateTime::from_unix_timestamp(ts.timestamp())
                .map_err(|e| Error::parse(SourceFormat::Binary, e))?;
            Ok(Some(t + Duration::nanoseconds(ts.timestamp_subsec_nanos() as i64)))
        }
        _ => Ok(None),
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(v) => Some(*v as f64),
        Value::Float64(v) => Some(*v),
        Value::SInt8(v) => Some(*v as f64),
        Value::UInt8(v) => Some(*v as f64),
        Value::UInt8z(v) => Some(*v as f64),
        Value::SInt16(v) => Some(*v as f64),
        Value::UInt16(v) => Some(*v as f64),
        Value::UInt16z(v) => Some(*v as f64),
        Value::SInt32(v) => Some(*v as f64),
        Value::UInt32(v) => Some(*v as f64),
        Value::UInt32z(v) => Some(*v as f64),
        Value::SInt64(v) => Some(*v as f64),
        Value::UInt64(v) => Some(*v as f64),
        Value::UInt64z(v) => Some(*v as f64),
        Value::Byte(v) => Some(*v as f64),
        Value::Array(values) => values.iter().find_map(value_to_f64),
        _ => None,
    }
}
