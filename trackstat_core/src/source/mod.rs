//! Sources turn the bytes of a recording into raw points plus metadata.
//! There is one implementation per file family, and `source_for` picks the
//! right one for a file.

use std::path::Path;

use log::{debug, info};

use crate::{
    config::AnalysisConfig,
    error::{Error, Result, SourceFormat},
    model::ParsedActivity,
};

mod activity_types;
mod backfill;
mod device;
mod xml;

pub use activity_types::{activity_type_from_sport, resolve_track_activity_type};
pub use backfill::{BackfillQueue, DeviceSample};
pub use device::BinaryDeviceSource;
pub use xml::XmlTrackSource;

/// Something that can parse a fully-buffered recording.
pub trait RawPointSource {
    /// The family of files this source understands.
    fn format(&self) -> SourceFormat;

    /// Parses a recording. The points come back in recording order with
    /// their positions resolved.
    fn parse(&self, data: &[u8], config: &AnalysisConfig) -> Result<ParsedActivity>;

    /// Reads the whole file into memory and parses it.
    fn parse_file(&self, path: &Path, config: &AnalysisConfig) -> Result<ParsedActivity> {
        info!("Reading {} file {:?}", self.format(), path);
        let data = std::fs::read(path)?;
        self.parse(&data, config)
    }
}

/// Works out the format of a file, preferring what the bytes say over
/// what the extension says.
pub fn detect_format(path: &Path, data: &[u8]) -> Result<SourceFormat> {
    // The FIT header carries the ASCII signature ".FIT" at bytes 8..12.
    if data.len() >= 12 && &data[8..12] == b".FIT" {
        return Ok(SourceFormat::Binary);
    }

    // Skip any UTF-8 byte order mark and leading whitespace.
    let text = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    if text.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<') {
        return Ok(SourceFormat::Xml);
    }

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("fit") => Ok(SourceFormat::Binary),
        Some("gpx") => Ok(SourceFormat::Xml),
        _ => Err(Error::InvalidArgument(format!(
            "No suitable parser found for file {path:?}"
        ))),
    }
}

/// Returns the source for a format.
pub fn source_for_format(format: SourceFormat) -> Box<dyn RawPointSource + Send + Sync> {
    match format {
        SourceFormat::Xml => Box::new(XmlTrackSource),
        SourceFormat::Binary => Box::new(BinaryDeviceSource),
    }
}

/// Returns the source that can parse the given file contents.
pub fn source_for(path: &Path, data: &[u8]) -> Result<Box<dyn RawPointSource + Send + Sync>> {
    let format = detect_format(path, data)?;
    debug!("Detected {format} format for {:?}", path);
    Ok(source_for_format(format))
}

/// Reads a recording from disk and parses it with whichever source fits.
pub fn parse_activity_file<P: AsRef<Path>>(
    path: P,
    config: &AnalysisConfig,
) -> Result<ParsedActivity> {
    let path = path.as_ref();
    info!("Reading activity file {:?}", path);
    let data = std::fs::read(path)?;
    source_for(path, &data)?.parse(&data, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_signature_wins_over_extension() {
        let mut header = vec![14u8, 0x10, 0, 0, 0, 0, 0, 0];
        header.extend_from_slice(b".FIT");
        let format = detect_format(Path::new("run.gpx"), &header).unwrap();
        assert_eq!(format, SourceFormat::Binary);
    }

    #[test]
    fn xml_is_detected_after_bom_and_whitespace() {
        let data = b"\xEF\xBB\xBF  \n<?xml version=\"1.0\"?><gpx/>";
        let format = detect_format(Path::new("activity.bin"), data).unwrap();
        assert_eq!(format, SourceFormat::Xml);
    }

    #[test]
    fn falls_back_to_extension() {
        assert_eq!(
            detect_format(Path::new("RUN.FIT"), b"").unwrap(),
            SourceFormat::Binary
        );
        assert_eq!(
            detect_format(Path::new("walk.gpx"), b"").unwrap(),
            SourceFormat::Xml
        );
    }

    #[test]
    fn unknown_files_are_rejected() {
        let err = detect_format(Path::new("notes.txt"), b"hello").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn factory_returns_matching_source() {
        assert_eq!(source_for_format(SourceFormat::Xml).format(), SourceFormat::Xml);
        assert_eq!(
            source_for_format(SourceFormat::Binary).format(),
            SourceFormat::Binary
        );
    }
}
