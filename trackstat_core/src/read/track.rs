use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::gpx_model::GpxTrack;

use super::{track_segment::parse_track_segment, XmlReaderExtensions};

pub(crate) fn parse_track(xml_reader: &mut Reader<&[u8]>) -> Result<GpxTrack> {
    let mut track = GpxTrack::default();

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"name" => {
                    track.name = Some(xml_reader.read_inner_as_string()?);
                }
                b"desc" => {
                    track.description = Some(xml_reader.read_inner_as_string()?);
                }
                b"type" => {
                    track.r#type = Some(xml_reader.read_inner_as_string()?);
                }
                b"trkseg" => {
                    track.segments.push(parse_track_segment(xml_reader)?);
                }
                // cmt, src, link, number, extensions.
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"trk" => {
                    return Ok(track);
                }
                _ => {}
            },
            // An empty <trkseg/> has no points to contribute.
            Ok(Event::Empty(_)) | Ok(Event::Comment(_)) => {}
            e => bail!("Unexpected element {:?}", e),
        }
    }
}
