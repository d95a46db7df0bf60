use std::{fmt::Write, path::PathBuf};

use trackstat_core::{
    ActivitySummary, LapSummary, SessionMetadata, SplitMarker, SplitSummary,
};

use crate::formatting::{format_date, format_duration, format_opt, format_pace};

/// Everything we work out for one input file.
#[derive(Debug)]
pub struct ActivityReport {
    pub path: PathBuf,
    pub metadata: SessionMetadata,
    pub summary: ActivitySummary,
    pub num_points: usize,
    pub split_unit: String,
    pub splits: Vec<SplitSummary>,
    pub markers: Vec<SplitMarker>,
    pub laps: Vec<LapSummary>,
}

impl ActivityReport {
    /// Renders the report as plain text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> std::fmt::Result {
        let md = &self.metadata;
        let s = &self.summary;

        writeln!(out, "{}", self.path.display())?;
        if let Some(name) = &md.name {
            writeln!(out, "  Name:      {name}")?;
        }
        writeln!(out, "  Type:      {}", md.activity_type)?;
        writeln!(out, "  Start:     {}", format_date(&md.start_time))?;
        writeln!(out, "  Points:    {}", self.num_points)?;
        writeln!(
            out,
            "  Distance:  {:.2} km ({:.2} miles)",
            s.distance_km, s.distance_miles
        )?;
        writeln!(out, "  Duration:  {}", format_duration(s.duration))?;
        writeln!(
            out,
            "  Pace:      {} /km, {} km/h",
            format_pace(s.mean_pace_per_km),
            format_opt(s.mean_speed_kmh)
        )?;
        writeln!(
            out,
            "  Centre:    {:.5}, {:.5}",
            s.centre.latitude, s.centre.longitude
        )?;
        if let (Some(metres), Some(duration)) = (md.device_distance_m, md.device_duration) {
            writeln!(
                out,
                "  Device:    {:.2} km in {}",
                metres / 1000.0,
                format_duration(duration)
            )?;
        }

        writeln!(out, "  Splits ({}):", self.split_unit)?;
        for split in &self.splits {
            let reached = self
                .markers
                .iter()
                .find(|m| m.ends == split.bucket_id)
                .map(|m| format_date(&m.time))
                .unwrap_or_default();
            writeln!(
                out,
                "    {:>3}  {:>9}  pace {:>6}  hr {:>5}  cad {:>5}  ele {:>7}  {}",
                split.bucket_id + 1,
                format_duration(split.duration),
                format_pace(split.mean_pace),
                format_opt(split.mean_heart_rate),
                format_opt(split.mean_cadence),
                format_opt(split.mean_elevation),
                reached
            )?;
        }

        if !self.laps.is_empty() {
            writeln!(out, "  Laps:")?;
            for lap in &self.laps {
                writeln!(
                    out,
                    "    {:>3}  {:>9}  {:>8.2} km  {:>5} km/h  hr {:>5}  cad {:>5}",
                    lap.lap_no,
                    format_duration(lap.duration),
                    lap.distance_m / 1000.0,
                    format_opt(lap.mean_speed_kmh),
                    format_opt(lap.mean_heart_rate),
                    format_opt(lap.mean_cadence)
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, Duration};
    use trackstat_core::{
        get_split_markers, get_split_summary, geo_math::destination, summarize,
        summarize_laps, AnalysisConfig, PointSeriesBuilder, RawPoint, SessionMetadata,
    };

    use super::*;

    #[test]
    fn renders_splits_and_laps() {
        let start = datetime!(2023-03-03 18:00:00 UTC);
        let (mut lat, mut lon) = (52.2, 0.12);
        let raw: Vec<RawPoint> = (0..30)
            .map(|i| {
                if i > 0 {
                    (lat, lon) = destination(lat, lon, 90.0, 80.0);
                }
                RawPoint::new(i, lat, lon, start + Duration::seconds(20 * i as i64))
            })
            .collect();
        let series = PointSeriesBuilder::new(&AnalysisConfig::default())
            .build(&raw)
            .unwrap();

        let mut metadata = SessionMetadata::new(start);
        metadata.name = Some("Evening Run".to_string());

        let report = ActivityReport {
            path: PathBuf::from("evening.gpx"),
            metadata,
            summary: summarize(&series),
            num_points: series.len(),
            split_unit: "km".to_string(),
            splits: get_split_summary(&series, "km").unwrap(),
            markers: get_split_markers(&series, "km").unwrap(),
            laps: summarize_laps(&series, &[start, start + Duration::seconds(300)]).unwrap(),
        };

        let text = report.render();
        assert!(text.starts_with("evening.gpx\n"));
        assert!(text.contains("Name:      Evening Run"));
        assert!(text.contains("Distance:  2.32 km"));
        assert!(text.contains("Splits (km):"));
        // 80 m every 20 s is 4:10 per km.
        assert!(text.contains("pace   4:10"));
        assert!(text.contains("Laps:"));
    }
}
