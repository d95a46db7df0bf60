use serde::Serialize;
use time::Duration;

use crate::{
    geo_math::{mean, Lat, Lon},
    series::PointSeries,
    units::{METRES_PER_KM, METRES_PER_MILE},
};

/// The mean position of all the points of an activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Centre {
    pub latitude: Lat,
    pub longitude: Lon,
    pub elevation: Option<f64>,
}

/// Headline figures for a whole activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub distance_km: f64,
    pub distance_miles: f64,
    pub duration: Duration,
    /// Seconds per km.
    pub mean_pace_per_km: Option<f64>,
    pub mean_speed_kmh: Option<f64>,
    pub centre: Centre,
}

pub fn summarize(series: &PointSeries) -> ActivitySummary {
    let metres = series.total_distance_m();
    let n = series.len() as f64;

    let (lat_sum, lon_sum) = series
        .points()
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));

    ActivitySummary {
        distance_km: metres / METRES_PER_KM,
        distance_miles: metres / METRES_PER_MILE,
        duration: series.duration(),
        mean_pace_per_km: mean(series.points().iter().map(|p| p.pace_per_km)),
        mean_speed_kmh: mean(series.points().iter().map(|p| p.speed_kmh)),
        centre: Centre {
            latitude: lat_sum / n,
            longitude: lon_sum / n,
            elevation: mean(series.points().iter().map(|p| p.elevation)),
        },
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::{config::AnalysisConfig, model::RawPoint, series::PointSeriesBuilder};

    #[test]
    fn summary_of_a_short_walk() {
        let start = datetime!(2022-11-01 14:00:00 UTC);
        let mut raw = vec![
            RawPoint::new(0, 50.0, 0.0, start),
            RawPoint::new(1, 50.0, 0.0, start + Duration::minutes(10)),
            RawPoint::new(2, 51.0, 0.0, start + Duration::minutes(20)),
        ];
        raw[0].elevation = Some(10.0);
        raw[2].elevation = Some(20.0);

        let series = PointSeriesBuilder::new(&AnalysisConfig::default())
            .build(&raw)
            .unwrap();
        let summary = summarize(&series);

        // One degree of latitude is about 111.2 km.
        assert!((summary.distance_km - 111.195).abs() < 0.01);
        assert!((summary.distance_miles - 69.093).abs() < 0.01);
        assert_eq!(summary.duration, Duration::minutes(20));
        // Too few points for a pace.
        assert_eq!(summary.mean_pace_per_km, None);
        assert_eq!(summary.mean_speed_kmh, None);
        assert!((summary.centre.latitude - 50.333_333).abs() < 1e-5);
        assert_eq!(summary.centre.longitude, 0.0);
        assert_eq!(summary.centre.elevation, Some(15.0));
    }
}
