use std::path::Path;

use log::debug;
use logging_timer::time;

use crate::{
    config::AnalysisConfig,
    error::{Error, Result, SourceFormat},
    gpx_model::GpxDocument,
    model::{ParsedActivity, RawPoint, SessionMetadata},
    read::{read_gpx_from_file, read_gpx_from_slice},
};

use super::{activity_types::resolve_track_activity_type, RawPointSource};

/// Parses GPX 1.1 track files.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTrackSource;

impl RawPointSource for XmlTrackSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Xml
    }

    #[time]
    fn parse(&self, data: &[u8], _config: &AnalysisConfig) -> Result<ParsedActivity> {
        let gpx = read_gpx_from_slice(data).map_err(|e| Error::parse(SourceFormat::Xml, e))?;
        activity_from_gpx(gpx)
    }

    /// Same as the default, but the file name is kept for log messages.
    fn parse_file(&self, path: &Path, _config: &AnalysisConfig) -> Result<ParsedActivity> {
        let gpx = read_gpx_from_file(path).map_err(|e| match e.downcast::<std::io::Error>() {
            Ok(io) => Error::Io(io),
            Err(e) => Error::parse(SourceFormat::Xml, e),
        })?;
        activity_from_gpx(gpx)
    }
}

/// Walks every point of every segment of every track, in document order.
fn raw_points(gpx: &GpxDocument) -> Vec<RawPoint> {
    let mut points = Vec::with_capacity(gpx.num_points());

    for (track_no, track) in gpx.tracks.iter().enumerate() {
        for (segment_no, segment) in track.segments.iter().enumerate() {
            for p in &segment.points {
                points.push(RawPoint {
                    point_no: points.len() as u32,
                    track_no: track_no as u32,
                    segment_no: segment_no as u32,
                    latitude: Some(p.lat),
                    longitude: Some(p.lon),
                    elevation: p.ele,
                    time: p.time,
                    heart_rate: p.heart_rate(),
                    cadence: p.cadence(),
                });
            }
        }
    }

    points
}

pub(crate) fn activity_from_gpx(gpx: GpxDocument) -> Result<ParsedActivity> {
    let points = raw_points(&gpx);

    // Without a single timestamp there is nothing to measure, so this is
    // reported as a broken document rather than a point missing its time.
    let start_time = gpx
        .metadata
        .time
        .or_else(|| points.iter().find_map(|p| p.time))
        .ok_or_else(|| {
            Error::parse(
                SourceFormat::Xml,
                "the document has no metadata time and no timed trackpoints",
            )
        })?;

    let first_track = gpx.tracks.first();
    let mut metadata = SessionMetadata::new(start_time);
    metadata.name = gpx
        .metadata
        .name
        .clone()
        .or_else(|| first_track.and_then(|t| t.name.clone()));
    metadata.description = gpx
        .metadata
        .description
        .clone()
        .or_else(|| first_track.and_then(|t| t.description.clone()));
    metadata.activity_type = resolve_track_activity_type(
        first_track.and_then(|t| t.r#type.as_deref()),
        &gpx.creator,
    );
    metadata.creator = Some(gpx.creator.clone());

    debug!(
        "GPX activity {:?}: {} points in {} tracks, type {}",
        gpx.filename,
        points.len(),
        gpx.tracks.len(),
        metadata.activity_type
    );

    Ok(ParsedActivity {
        points,
        metadata,
        // GPX has no notion of laps.
        lap_starts: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    use super::*;
    use crate::model::ActivityType;

    const TWO_TRACKS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx creator="Garmin Connect" version="1.1"
     xmlns:ns3="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
  <trk>
    <name>Lunch Walk</name>
    <type>walking</type>
    <trkseg>
      <trkpt lat="51.0" lon="-1.0"><time>2022-06-01T12:00:00Z</time>
        <extensions><ns3:TrackPointExtension><ns3:hr>90</ns3:hr></ns3:TrackPointExtension></extensions>
      </trkpt>
      <trkpt lat="51.001" lon="-1.0"><time>2022-06-01T12:00:10Z</time></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="51.002" lon="-1.0"><time>2022-06-01T12:00:20Z</time></trkpt>
    </trkseg>
  </trk>
  <trk>
    <trkseg>
      <trkpt lat="51.003" lon="-1.0"><time>2022-06-01T12:00:30Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn points_are_numbered_across_tracks_and_segments() {
        let activity = XmlTrackSource
            .parse(TWO_TRACKS.as_bytes(), &AnalysisConfig::default())
            .unwrap();

        let numbering: Vec<(u32, u32, u32)> = activity
            .points
            .iter()
            .map(|p| (p.point_no, p.track_no, p.segment_no))
            .collect();
        assert_eq!(numbering, vec![(0, 0, 0), (1, 0, 0), (2, 0, 1), (3, 1, 0)]);

        assert_eq!(activity.points[0].heart_rate, Some(90));
        assert_eq!(activity.points[0].cadence, None);
        assert_eq!(activity.points[1].heart_rate, None);
    }

    #[test]
    fn metadata_falls_back_to_first_track() {
        let activity = XmlTrackSource
            .parse(TWO_TRACKS.as_bytes(), &AnalysisConfig::default())
            .unwrap();
        let md = activity.metadata;

        assert_eq!(md.name.as_deref(), Some("Lunch Walk"));
        assert_eq!(md.start_time, datetime!(2022-06-01 12:00:00 UTC));
        assert_eq!(md.activity_type, ActivityType::Walk);
        assert_eq!(md.creator.as_deref(), Some("Garmin Connect"));
        assert!(activity.lap_starts.is_empty());
    }

    #[test]
    fn untimed_document_is_a_parse_error() {
        let untimed = r#"<gpx creator="x" version="1.1"><trk><trkseg>
            <trkpt lat="51.0" lon="-1.0"><ele>10</ele></trkpt>
            <trkpt lat="51.001" lon="-1.0"><ele>11</ele></trkpt>
        </trkseg></trk></gpx>"#;

        let err = XmlTrackSource
            .parse(untimed.as_bytes(), &AnalysisConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                format: SourceFormat::Xml,
                ..
            }
        ));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = XmlTrackSource
            .parse(b"<gpx creator=\"x\" version=\"1.1\"><trk>", &AnalysisConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                format: SourceFormat::Xml,
                ..
            }
        ));
    }
}
