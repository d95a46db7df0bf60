//! Turns the raw points of an activity into an enriched, read-only
//! series of track points.

use log::{debug, info};
use logging_timer::time;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::{
    config::AnalysisConfig,
    error::{Error, Result},
    geo_math::{cumulative_sum, step_distances},
    model::{RawPoint, TrackPoint},
    outlier::OutlierCorrector,
    units::{kmh_from_pace, kmh_to_mph, pace_secs, SplitUnit, KM_PER_MILE, METRES_PER_KM},
};

/// An ordered, immutable sequence of enriched points. There is always at
/// least one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PointSeries {
    points: Vec<TrackPoint>,
}

impl PointSeries {
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false, a series cannot be built from nothing.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &TrackPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &TrackPoint {
        &self.points[self.points.len() - 1]
    }

    pub fn start_time(&self) -> OffsetDateTime {
        self.first().time
    }

    pub fn end_time(&self) -> OffsetDateTime {
        self.last().time
    }

    /// Time between the first and last points.
    pub fn duration(&self) -> Duration {
        self.end_time() - self.start_time()
    }

    pub fn total_distance_m(&self) -> f64 {
        self.last().cumulative_distance_m
    }

    /// The split bucket of every point for a unit.
    pub fn buckets(&self, unit: SplitUnit) -> Vec<u32> {
        self.points.iter().map(|p| bucket_of(p, unit)).collect()
    }
}

impl<'a> IntoIterator for &'a PointSeries {
    type Item = &'a TrackPoint;
    type IntoIter = std::slice::Iter<'a, TrackPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// The bucket that a point falls in for a unit.
pub fn bucket_of(point: &TrackPoint, unit: SplitUnit) -> u32 {
    match unit {
        SplitUnit::Km => point.km_bucket,
        SplitUnit::Mile => point.mile_bucket,
    }
}

/// The pace of a point in a unit, in seconds per unit.
pub fn pace_of(point: &TrackPoint, unit: SplitUnit) -> Option<f64> {
    match unit {
        SplitUnit::Km => point.pace_per_km,
        SplitUnit::Mile => point.pace_per_mile,
    }
}

/// Builds PointSeries from raw points.
#[derive(Debug, Clone)]
pub struct PointSeriesBuilder<'c> {
    config: &'c AnalysisConfig,
}

impl<'c> PointSeriesBuilder<'c> {
    pub fn new(config: &'c AnalysisConfig) -> Self {
        Self { config }
    }

    /// Validates the raw points and works out the derived columns.
    #[time]
    pub fn build(&self, raw: &[RawPoint]) -> Result<PointSeries> {
        let resolved = validate(raw)?;
        let resolved = if self.config.drop_duplicate_times {
            drop_duplicate_times(resolved)
        } else {
            resolved
        };

        let coords: Vec<_> = resolved.iter().map(|r| (r.latitude, r.longitude)).collect();
        let steps = step_distances(&coords);
        let cumulative = cumulative_sum(&steps);
        let times: Vec<_> = resolved.iter().map(|r| r.time).collect();

        let paces = interval_paces(&cumulative, &times, self.config.pace_interval);
        let paces = OutlierCorrector::new(self.config.outlier_z_threshold).correct(&paces);

        let start = times[0];
        let points: Vec<TrackPoint> = resolved
            .into_iter()
            .enumerate()
            .map(|(idx, r)| {
                let cum = cumulative[idx];
                let pace_per_km = paces[idx];
                let speed_kmh = pace_per_km.and_then(kmh_from_pace);

                TrackPoint {
                    point_no: r.point_no,
                    track_no: r.track_no,
                    segment_no: r.segment_no,
                    latitude: r.latitude,
                    longitude: r.longitude,
                    elevation: r.elevation,
                    time: r.time,
                    heart_rate: r.heart_rate,
                    cadence: r.cadence,
                    step_distance_m: steps[idx],
                    cumulative_distance_m: cum,
                    km_bucket: (cum / SplitUnit::Km.length_metres()).floor() as u32,
                    mile_bucket: (cum / SplitUnit::Mile.length_metres()).floor() as u32,
                    pace_per_km,
                    pace_per_mile: pace_per_km.map(|p| p * KM_PER_MILE),
                    speed_kmh,
                    speed_mph: speed_kmh.map(kmh_to_mph),
                    elapsed_since_start: r.time - start,
                }
            })
            .collect();

        info!(
            "Built a series of {} points covering {:.0} metres",
            points.len(),
            points.last().map_or(0.0, |p| p.cumulative_distance_m)
        );

        Ok(PointSeries { points })
    }
}

/// A raw point whose mandatory fields are known to be present.
#[derive(Debug, Clone)]
struct ResolvedPoint {
    point_no: u32,
    track_no: u32,
    segment_no: u32,
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
    time: OffsetDateTime,
    heart_rate: Option<u16>,
    cadence: Option<u16>,
}

fn validate(raw: &[RawPoint]) -> Result<Vec<ResolvedPoint>> {
    if raw.is_empty() {
        return Err(Error::Schema("there are no points".into()));
    }

    let mut resolved: Vec<ResolvedPoint> = Vec::with_capacity(raw.len());

    for p in raw {
        let (Some(latitude), Some(longitude), Some(time)) = (p.latitude, p.longitude, p.time)
        else {
            let mut fields = Vec::new();
            if p.latitude.is_none() {
                fields.push("latitude");
            }
            if p.longitude.is_none() {
                fields.push("longitude");
            }
            if p.time.is_none() {
                fields.push("time");
            }
            return Err(Error::MissingFields {
                point_no: p.point_no,
                fields,
            });
        };

        if let Some(prev) = resolved.last() {
            if p.point_no <= prev.point_no {
                return Err(Error::Schema(format!(
                    "point number {} follows point number {}",
                    p.point_no, prev.point_no
                )));
            }
            if time < prev.time {
                return Err(Error::Schema(format!(
                    "point {} at {} is earlier than point {} at {}",
                    p.point_no, time, prev.point_no, prev.time
                )));
            }
        }

        resolved.push(ResolvedPoint {
            point_no: p.point_no,
            track_no: p.track_no,
            segment_no: p.segment_no,
            latitude,
            longitude,
            elevation: p.elevation,
            time,
            heart_rate: p.heart_rate,
            cadence: p.cadence,
        });
    }

    Ok(resolved)
}

/// Keeps the first of each run of points that share a timestamp.
fn drop_duplicate_times(points: Vec<ResolvedPoint>) -> Vec<ResolvedPoint> {
    let before = points.len();
    let mut kept: Vec<ResolvedPoint> = Vec::with_capacity(before);

    for p in points {
        match kept.last() {
            Some(prev) if prev.time == p.time => {}
            _ => kept.push(p),
        }
    }

    if kept.len() < before {
        debug!(
            "Dropped {} points with duplicate timestamps",
            before - kept.len()
        );
    }

    kept
}

/// Pace in seconds per km, measured over the last `interval` points. The
/// first `interval` points have no pace, nor do points where no distance
/// was covered over the interval.
fn interval_paces(cumulative: &[f64], times: &[OffsetDateTime], interval: usize) -> Vec<Option<f64>> {
    let interval = interval.max(1);

    (0..cumulative.len())
        .map(|i| {
            if i < interval {
                return None;
            }
            let metres = cumulative[i] - cumulative[i - interval];
            let seconds = (times[i] - times[i - interval]).as_seconds_f64();
            pace_secs(METRES_PER_KM, metres, seconds)
        })
        .collect()
}
