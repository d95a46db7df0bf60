use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::gpx_model::{GpxPoint, GpxSegment};

use super::{attributes::Attributes, trackpoint::parse_trackpoint, XmlReaderExtensions};

pub(crate) fn parse_track_segment(xml_reader: &mut Reader<&[u8]>) -> Result<GpxSegment> {
    let mut segment = GpxSegment::default();

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"trkpt" => {
                    let attrs = Attributes::new(&e, xml_reader)?;
                    segment.points.push(parse_trackpoint(attrs, xml_reader)?);
                }
                _ => xml_reader.skip_element(&e)?,
            },
            // A point with nothing but a position, <trkpt lat=".." lon=".."/>.
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"trkpt" => {
                    let mut attrs = Attributes::new(&e, xml_reader)?;
                    let point = GpxPoint::with_lat_lon(attrs.get("lat")?, attrs.get("lon")?);
                    segment.points.push(point);
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"trkseg" => {
                    return Ok(segment);
                }
                _ => {}
            },
            Ok(Event::Comment(_)) => {}
            e => bail!("Unexpected element {:?}", e),
        }
    }
}
