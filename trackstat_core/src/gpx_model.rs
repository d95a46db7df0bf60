use std::path::PathBuf;

use time::OffsetDateTime;

use crate::geo_math::{Lat, Lon};

/// The parts of a GPX file that we care about. Based on the XSD at
/// https://www.topografix.com/GPX/1/1/gpx.xsd, but waypoints, routes and
/// most of the metadata are skipped by the reader.
#[derive(Debug, Clone, Default)]
pub struct GpxDocument {
    /// Not part of the XSD, but handy for log messages.
    pub filename: Option<PathBuf>,
    /// The 'version' attribute. This should always be "1.1".
    pub version: String,
    /// The 'creator' attribute, used to recognise the exporting program.
    pub creator: String,
    pub metadata: GpxMetadata,
    pub tracks: Vec<GpxTrack>,
}

impl GpxDocument {
    /// Total number of points across all tracks and segments.
    pub fn num_points(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(|t| &t.segments)
            .map(|s| s.points.len())
            .sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GpxMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    /// The creation date of the file.
    pub time: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Type (classification) of the track. Exporters put their own
    /// activity codes in here.
    pub r#type: Option<String>,
    pub segments: Vec<GpxSegment>,
}

#[derive(Debug, Clone, Default)]
pub struct GpxSegment {
    pub points: Vec<GpxPoint>,
}

/// A 'trkpt' element.
#[derive(Debug, Clone)]
pub struct GpxPoint {
    pub lat: Lat,
    pub lon: Lon,
    pub ele: Option<f64>,
    pub time: Option<OffsetDateTime>,
    pub extensions: Option<TrackPointExtensions>,
}

impl GpxPoint {
    pub fn with_lat_lon(lat: Lat, lon: Lon) -> Self {
        Self {
            lat,
            lon,
            ele: None,
            time: None,
            extensions: None,
        }
    }

    pub fn heart_rate(&self) -> Option<u16> {
        self.extensions.as_ref().and_then(|ext| ext.heart_rate)
    }

    pub fn cadence(&self) -> Option<u16> {
        self.extensions.as_ref().and_then(|ext| ext.cadence)
    }
}

/// The sensor values from the Garmin TrackPointExtension block, which
/// Strava also writes.
#[derive(Debug, Clone, Default)]
pub struct TrackPointExtensions {
    pub heart_rate: Option<u16>,
    pub cadence: Option<u16>,
}
