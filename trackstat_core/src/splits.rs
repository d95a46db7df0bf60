//! Splitting an activity into whole km or miles.
//!
//! Recorded points almost never fall exactly on a split boundary, so for
//! each boundary we interpolate a marker between the last point before it
//! and the first point after it. Markers are also what the split durations
//! are measured between.

use std::collections::BTreeMap;

use log::debug;
use time::Duration;

use crate::{
    error::Result,
    geo_math::{interpolate, interpolate_opt, mean},
    model::{SplitMarker, SplitSummary, TrackPoint},
    series::{bucket_of, pace_of, PointSeries},
    units::SplitUnit,
};

/// Markers for every split boundary crossed by the series. `unit` must be
/// "km" or "mile".
pub fn get_split_markers(series: &PointSeries, unit: &str) -> Result<Vec<SplitMarker>> {
    Ok(split_markers(series, unit.parse()?))
}

/// Summaries for every split of the series. `unit` must be "km" or "mile".
pub fn get_split_summary(series: &PointSeries, unit: &str) -> Result<Vec<SplitSummary>> {
    Ok(split_summary(series, unit.parse()?))
}

/// Markers for the boundaries `b` with `first bucket < b <= last bucket`.
/// There are none unless the series covers at least two buckets.
pub fn split_markers(series: &PointSeries, unit: SplitUnit) -> Vec<SplitMarker> {
    let points = series.points();
    let first_bucket = bucket_of(series.first(), unit);
    let last_bucket = bucket_of(series.last(), unit);

    let markers: Vec<SplitMarker> = (first_bucket + 1..=last_bucket)
        .filter_map(|boundary| {
            // Buckets never decrease, so this is the first point at or past
            // the boundary and everything before it is short of it.
            let idx = points.partition_point(|p| bucket_of(p, unit) < boundary);
            let p1 = points.get(idx.checked_sub(1)?)?;
            let p2 = points.get(idx)?;
            Some(interpolate_marker(p1, p2, boundary, unit))
        })
        .collect();

    debug!("Found {} {unit} split markers", markers.len());
    markers
}

fn interpolate_marker(p1: &TrackPoint, p2: &TrackPoint, boundary: u32, unit: SplitUnit) -> SplitMarker {
    let boundary_metres = boundary as f64 * unit.length_metres();
    let underrun = boundary_metres - p1.cumulative_distance_m;
    let overrun = p2.cumulative_distance_m - boundary_metres;
    let span = underrun + overrun;

    if span <= 0.0 {
        return SplitMarker {
            ends: boundary - 1,
            begins: boundary,
            latitude: p1.latitude,
            longitude: p1.longitude,
            elevation: p1.elevation,
            time: p1.time,
            heart_rate: p1.heart_rate_f64(),
            cadence: p1.cadence_f64(),
            cumulative_distance_m: p1.cumulative_distance_m,
            portion: None,
        };
    }

    // Rounding in the bucket division can leave us a hair either side.
    let portion = (underrun / span).clamp(0.0, 1.0);
    SplitMarker {
        ends: boundary - 1,
        begins: boundary,
        latitude: interpolate(p1.latitude, p2.latitude, portion),
        longitude: interpolate(p1.longitude, p2.longitude, portion),
        elevation: interpolate_opt(p1.elevation, p2.elevation, portion),
        time: p1.time + (p2.time - p1.time) * portion,
        heart_rate: interpolate_opt(p1.heart_rate_f64(), p2.heart_rate_f64(), portion),
        cadence: interpolate_opt(p1.cadence_f64(), p2.cadence_f64(), portion),
        cumulative_distance_m: interpolate(p1.cumulative_distance_m, p2.cumulative_distance_m, portion),
        portion: Some(portion),
    }
}

/// One summary per bucket that has points, in bucket order.
pub fn split_summary(series: &PointSeries, unit: SplitUnit) -> Vec<SplitSummary> {
    let mut groups: BTreeMap<u32, Vec<&TrackPoint>> = BTreeMap::new();
    for p in series {
        groups.entry(bucket_of(p, unit)).or_default().push(p);
    }

    let markers = split_markers(series, unit);
    let marker_time = |boundary: u32| {
        markers
            .iter()
            .find(|m| m.begins == boundary)
            .map(|m| m.time)
    };

    let first_bucket = bucket_of(series.first(), unit);
    let last_bucket = bucket_of(series.last(), unit);

    groups
        .into_iter()
        .map(|(bucket_id, group)| {
            let lower = if bucket_id == first_bucket {
                Some(series.start_time())
            } else {
                marker_time(bucket_id)
            };
            let upper = if bucket_id == last_bucket {
                Some(series.end_time())
            } else {
                marker_time(bucket_id + 1)
            };
            let duration = match (lower, upper) {
                (Some(lower), Some(upper)) => upper - lower,
                _ => Duration::ZERO,
            };

            SplitSummary {
                bucket_id,
                mean_pace: mean(group.iter().map(|p| pace_of(p, unit))),
                mean_heart_rate: mean(group.iter().map(|p| p.heart_rate_f64())),
                mean_cadence: mean(group.iter().map(|p| p.cadence_f64())),
                mean_elevation: mean(group.iter().map(|p| p.elevation)),
                duration,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::{macros::datetime, OffsetDateTime};

    use super::*;
    use crate::{
        config::AnalysisConfig, error::Error, geo_math::destination, model::RawPoint,
        series::PointSeriesBuilder,
    };

    const START: OffsetDateTime = datetime!(2020-09-12 10:00:00 UTC);

    /// Heads north in steps of `metres`, one step every `secs` seconds.
    fn series(steps: &[f64], secs: i64) -> PointSeries {
        let (mut lat, mut lon) = (45.0, 6.0);
        let mut raw = vec![];
        for (i, metres) in std::iter::once(&0.0).chain(steps).enumerate() {
            (lat, lon) = destination(lat, lon, 0.0, *metres);
            let mut p = RawPoint::new(i as u32, lat, lon, START + Duration::seconds(secs * i as i64));
            p.elevation = Some(100.0 + i as f64);
            p.heart_rate = Some(150);
            raw.push(p);
        }
        PointSeriesBuilder::new(&AnalysisConfig::default())
            .build(&raw)
            .unwrap()
    }

    fn secs_since_start(t: OffsetDateTime) -> f64 {
        (t - START).as_seconds_f64()
    }

    #[test]
    fn markers_lie_on_the_boundaries() {
        let series = series(&[320.0; 12], 60);
        let markers = split_markers(&series, SplitUnit::Km);

        let begins: Vec<u32> = markers.iter().map(|m| m.begins).collect();
        assert_eq!(begins, vec![1, 2, 3]);

        for m in &markers {
            assert_eq!(m.ends + 1, m.begins);
            let portion = m.portion.unwrap();
            assert!((0.0..=1.0).contains(&portion), "portion {portion}");
            assert!((m.cumulative_distance_m - m.begins as f64 * 1000.0).abs() < 1e-6);
            assert_eq!(m.heart_rate, Some(150.0));
        }

        // 1000 m is an eighth of the way from 960 m to 1280 m.
        let first = &markers[0];
        assert!((first.portion.unwrap() - 0.125).abs() < 1e-4);
        assert!((first.elevation.unwrap() - 103.125).abs() < 1e-3);
        assert!((secs_since_start(first.time) - 187.5).abs() < 0.01);
    }

    #[test]
    fn skipped_buckets_each_get_a_marker() {
        // One 2500 m jump takes us from bucket 0 to bucket 2.
        let series = series(&[2500.0, 100.0], 600);
        let markers = split_markers(&series, SplitUnit::Km);
        let begins: Vec<u32> = markers.iter().map(|m| m.begins).collect();
        assert_eq!(begins, vec![1, 2]);
        assert!((markers[0].portion.unwrap() - 0.4).abs() < 1e-3);
        assert!((markers[1].portion.unwrap() - 0.8).abs() < 1e-3);
    }

    #[test]
    fn fewer_than_two_buckets_has_no_markers() {
        let series = series(&[100.0, 100.0, 100.0], 30);
        assert!(split_markers(&series, SplitUnit::Km).is_empty());
        assert!(get_split_markers(&series, "mile").unwrap().is_empty());
    }

    #[test]
    fn unknown_units_are_rejected() {
        let series = series(&[100.0], 30);
        assert!(matches!(
            get_split_markers(&series, "furlong").unwrap_err(),
            Error::InvalidArgument(_)
        ));
        assert!(matches!(
            get_split_summary(&series, "KM").unwrap_err(),
            Error::InvalidArgument(_)
        ));
    }

    #[test]
    fn split_durations_cover_the_activity() {
        let series = series(&[320.0; 12], 60);
        let summary = split_summary(&series, SplitUnit::Km);

        let ids: Vec<u32> = summary.iter().map(|s| s.bucket_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        // Every full km takes 187.5 s, the last partial 840 m takes 157.5 s.
        let secs: Vec<f64> = summary.iter().map(|s| s.duration.as_seconds_f64()).collect();
        for (got, want) in secs.iter().zip([187.5, 187.5, 187.5, 157.5]) {
            assert!((got - want).abs() < 0.01, "got {got}, want {want}");
        }

        let total: Duration = summary.iter().map(|s| s.duration).sum();
        assert_eq!(total, series.duration());

        assert_eq!(summary[0].mean_heart_rate, Some(150.0));
        assert_eq!(summary[0].mean_cadence, None);
        // Points 0..=3 are in the first km.
        assert_eq!(summary[0].mean_elevation, Some(101.5));
        // 320 m per minute is 187.5 s per km.
        assert!((summary[2].mean_pace.unwrap() - 187.5).abs() < 0.01);
    }

    #[test]
    fn single_bucket_summary() {
        let series = series(&[100.0, 100.0], 30);
        let summary = get_split_summary(&series, "km").unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].duration, Duration::seconds(60));
        assert_eq!(summary[0].mean_pace, None);
    }
}
