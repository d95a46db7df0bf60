use anyhow::{bail, Result};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::gpx_model::GpxDocument;

use super::{
    attributes::Attributes, metadata::parse_metadata, track::parse_track, XmlReaderExtensions,
};

pub(crate) struct GpxAttributes {
    pub(crate) creator: String,
    pub(crate) version: String,
}

/// Parses the attributes on 'gpx' element itself. Gets around a multiple mut borrows
/// problem in the main read_gpx_from_reader() function.
pub(crate) fn parse_gpx_attributes<R>(
    tag: &BytesStart<'_>,
    xml_reader: &Reader<R>,
) -> Result<GpxAttributes> {
    let mut attributes = Attributes::new(tag, xml_reader)?;

    Ok(GpxAttributes {
        creator: attributes.get("creator")?,
        version: attributes.get("version")?,
    })
}

/// Parses the 'gpx' element itself.
pub(crate) fn parse_gpx(xml_reader: &mut Reader<&[u8]>) -> Result<GpxDocument> {
    let mut gpx = GpxDocument::default();

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"metadata" => {
                    gpx.metadata = parse_metadata(xml_reader)?;
                }
                b"trk" => {
                    let track = parse_track(xml_reader)?;
                    gpx.tracks.push(track);
                }
                // Waypoints, routes and file-level extensions.
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"gpx" => {
                    return Ok(gpx);
                }
                _ => (),
            },
            Ok(Event::Eof) => {
                bail!("Reached EOF unexpectedly. File is probably corrupt.");
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}
