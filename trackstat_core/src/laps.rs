//! Laps, as marked by the device (usually by pressing the lap button).

use std::ops::Range;

use log::debug;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    error::{Error, Result},
    geo_math::mean,
    model::{LapSummary, TrackPoint},
    series::PointSeries,
};

/// A lap: its recorded start time and the points that belong to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lap {
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// Indexes into the points of the series.
    pub points: Range<usize>,
}

/// Works out the laps of a series from their start times.
#[derive(Debug, Clone, Copy)]
pub struct LapAggregator<'s> {
    series: &'s PointSeries,
}

impl<'s> LapAggregator<'s> {
    pub fn new(series: &'s PointSeries) -> Self {
        Self { series }
    }

    /// Divides the points among the laps. A point belongs to the last lap
    /// that started at or before it; points recorded before the first lap
    /// started belong to the first lap.
    pub fn laps(&self, starts: &[OffsetDateTime]) -> Result<Vec<Lap>> {
        check_order(starts)?;
        let points = self.series.points();

        let mut laps = Vec::with_capacity(starts.len());
        let mut begin = 0;
        for (idx, start) in starts.iter().enumerate() {
            let end = match starts.get(idx + 1) {
                Some(next) => points.partition_point(|p| p.time < *next),
                None => points.len(),
            };
            let end = end.max(begin);
            laps.push(Lap {
                start_time: *start,
                points: begin..end,
            });
            begin = end;
        }

        Ok(laps)
    }

    /// One summary per lap start. The first lap is measured from the start
    /// of the series and the last to its end, so the lap durations always
    /// add up to the duration of the activity. The first lap still reports
    /// the device's own start time, even when that is later than the
    /// first point.
    pub fn summarize(&self, starts: &[OffsetDateTime]) -> Result<Vec<LapSummary>> {
        let laps = self.laps(starts)?;
        let points = self.series.points();

        let summaries: Vec<LapSummary> = laps
            .iter()
            .enumerate()
            .map(|(idx, lap)| {
                let (from_time, from_metres) = match idx {
                    0 => (self.series.start_time(), 0.0),
                    _ => (lap.start_time, self.cumulative_at(lap.start_time)),
                };
                let (to_time, to_metres) = match laps.get(idx + 1) {
                    Some(next) => (next.start_time, self.cumulative_at(next.start_time)),
                    None => (self.series.end_time(), self.series.total_distance_m()),
                };

                let lap_points: &[TrackPoint] = &points[lap.points.clone()];

                LapSummary {
                    lap_no: idx as u32 + 1,
                    start_time: lap.start_time,
                    duration: to_time - from_time,
                    distance_m: to_metres - from_metres,
                    mean_heart_rate: mean(lap_points.iter().map(|p| p.heart_rate_f64())),
                    mean_cadence: mean(lap_points.iter().map(|p| p.cadence_f64())),
                    mean_speed_kmh: mean(lap_points.iter().map(|p| p.speed_kmh)),
                }
            })
            .collect();

        debug!("Summarised {} laps", summaries.len());
        Ok(summaries)
    }

    /// Cumulative distance at the first point at or after `time`, or the
    /// total distance if there is no such point.
    fn cumulative_at(&self, time: OffsetDateTime) -> f64 {
        let points = self.series.points();
        let idx = points.partition_point(|p| p.time < time);
        points
            .get(idx)
            .map_or(self.series.total_distance_m(), |p| p.cumulative_distance_m)
    }
}

/// Convenience wrapper around [`LapAggregator::summarize`].
pub fn summarize_laps(series: &PointSeries, starts: &[OffsetDateTime]) -> Result<Vec<LapSummary>> {
    LapAggregator::new(series).summarize(starts)
}

fn check_order(starts: &[OffsetDateTime]) -> Result<()> {
    match starts.windows(2).position(|pair| pair[1] < pair[0]) {
        Some(idx) => Err(Error::Schema(format!(
            "lap {} starts at {}, before lap {} at {}",
            idx + 2,
            starts[idx + 1],
            idx + 1,
            starts[idx]
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::{macros::datetime, Duration};

    use super::*;
    use crate::{
        config::AnalysisConfig, geo_math::destination, model::RawPoint,
        series::PointSeriesBuilder,
    };

    const START: OffsetDateTime = datetime!(2024-01-20 08:00:00 UTC);

    /// 21 points, 100 m and 30 s apart, with the heart rate going up by one
    /// every point.
    fn series() -> PointSeries {
        let (mut lat, mut lon) = (40.0, -3.7);
        let raw: Vec<RawPoint> = (0..21)
            .map(|i| {
                if i > 0 {
                    (lat, lon) = destination(lat, lon, 0.0, 100.0);
                }
                let mut p = RawPoint::new(i, lat, lon, START + Duration::seconds(30 * i as i64));
                p.heart_rate = Some(100 + i as u16);
                p
            })
            .collect();
        PointSeriesBuilder::new(&AnalysisConfig::default())
            .build(&raw)
            .unwrap()
    }

    fn at(secs: i64) -> OffsetDateTime {
        START + Duration::seconds(secs)
    }

    #[test]
    fn no_starts_means_no_laps() {
        assert!(summarize_laps(&series(), &[]).unwrap().is_empty());
    }

    #[test]
    fn durations_sum_to_the_activity() {
        let series = series();
        // The first lap start is a little after the first point.
        let laps = summarize_laps(&series, &[at(10), at(200), at(450)]).unwrap();

        assert_eq!(laps.len(), 3);
        let lap_nos: Vec<u32> = laps.iter().map(|l| l.lap_no).collect();
        assert_eq!(lap_nos, vec![1, 2, 3]);

        assert_eq!(laps[0].duration, Duration::seconds(200));
        assert_eq!(laps[1].duration, Duration::seconds(250));
        assert_eq!(laps[2].duration, Duration::seconds(150));

        let total: Duration = laps.iter().map(|l| l.duration).sum();
        assert_eq!(total, series.duration());
    }

    #[test]
    fn late_first_lap_is_measured_from_the_first_point() {
        let series = series();
        let laps = summarize_laps(&series, &[at(90), at(200)]).unwrap();

        assert_eq!(laps[0].start_time, at(90));
        assert_eq!(laps[0].duration, Duration::seconds(200));
        assert!((laps[0].distance_m - 700.0).abs() < 0.01);
        assert_eq!(laps[1].start_time, at(200));
    }

    #[test]
    fn distances_are_measured_between_the_laps() {
        let series = series();
        let laps = summarize_laps(&series, &[at(0), at(200), at(450)]).unwrap();

        // The first point at or after 200 s is at 210 s (700 m), the first
        // at or after 450 s is at 450 s (1500 m).
        let metres: Vec<f64> = laps.iter().map(|l| l.distance_m).collect();
        for (got, want) in metres.iter().zip([700.0, 800.0, 500.0]) {
            assert!((got - want).abs() < 0.01, "got {got}, want {want}");
        }
        let total: f64 = metres.iter().sum();
        assert!((total - series.total_distance_m()).abs() < 1e-6);
    }

    #[test]
    fn sensor_means_use_the_points_of_each_lap() {
        let series = series();
        let laps = summarize_laps(&series, &[at(30), at(300)]).unwrap();

        // Lap 1 takes points 0..=9 (including the one before it started),
        // lap 2 takes points 10..=20.
        assert_eq!(laps[0].mean_heart_rate, Some(104.5));
        assert_eq!(laps[1].mean_heart_rate, Some(115.0));
        assert_eq!(laps[0].mean_cadence, None);

        // 100 m per 30 s is 12 km/h once the pace interval has filled.
        assert!((laps[1].mean_speed_kmh.unwrap() - 12.0).abs() < 0.01);
    }

    #[test]
    fn lap_ranges_cover_every_point_once() {
        let series = series();
        let laps = LapAggregator::new(&series)
            .laps(&[at(0), at(95), at(95), at(600)])
            .unwrap();
        let ranges: Vec<Range<usize>> = laps.iter().map(|l| l.points.clone()).collect();
        assert_eq!(ranges, vec![0..4, 4..4, 4..20, 20..21]);
    }

    #[test]
    fn out_of_order_starts_are_rejected() {
        let err = summarize_laps(&series(), &[at(100), at(50)]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
