use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::gpx_model::TrackPointExtensions;

use super::XmlReaderExtensions;

/// Parses the 'extensions' element of a trackpoint. Elements are matched on
/// their local name because every exporter picks its own namespace prefix
/// (gpxtpx:, ns3: ...). Anything that is not a heart rate or cadence is
/// walked over.
pub(crate) fn parse_trackpoint_extensions(
    xml_reader: &mut Reader<&[u8]>,
) -> Result<TrackPointExtensions> {
    let mut ext = TrackPointExtensions::default();

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"hr" => {
                    ext.heart_rate = Some(xml_reader.read_inner_as()?);
                }
                b"cad" => {
                    ext.cadence = Some(xml_reader.read_inner_as()?);
                }
                // Containers such as TrackPointExtension, and other vendors' data.
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"extensions" => {
                    return Ok(ext);
                }
                _ => {}
            },
            // Values of elements we are not interested in.
            Ok(Event::Text(_)) | Ok(Event::CData(_)) => {}
            Ok(Event::Empty(_)) | Ok(Event::Comment(_)) => {}
            e => bail!("Unexpected element {:?}", e),
        }
    }
}
