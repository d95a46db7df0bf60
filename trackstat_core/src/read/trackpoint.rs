use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::gpx_model::GpxPoint;

use super::{
    attributes::Attributes, trackpoint_extensions::parse_trackpoint_extensions,
    XmlReaderExtensions,
};

/// Parses the children of a 'trkpt' element. The start tag has already been
/// read, its attributes are passed in.
pub(crate) fn parse_trackpoint(
    mut attributes: Attributes,
    xml_reader: &mut Reader<&[u8]>,
) -> Result<GpxPoint> {
    let mut point = GpxPoint::with_lat_lon(attributes.get("lat")?, attributes.get("lon")?);

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"ele" => {
                    point.ele = Some(xml_reader.read_inner_as()?);
                }
                b"time" => {
                    point.time = Some(xml_reader.read_inner_as_time()?);
                }
                b"extensions" => {
                    point.extensions = Some(parse_trackpoint_extensions(xml_reader)?);
                }
                // magvar, geoidheight, name, sym, fix, sat, hdop and friends.
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"trkpt" => {
                    return Ok(point);
                }
                _ => {}
            },
            Ok(Event::Empty(_)) | Ok(Event::Comment(_)) => {}
            e => bail!("Unexpected element {:?}", e),
        }
    }
}
