use anyhow::{bail, Result};
use quick_xml::{events::Event, Reader};

use crate::gpx_model::GpxMetadata;

use super::XmlReaderExtensions;

pub(crate) fn parse_metadata(xml_reader: &mut Reader<&[u8]>) -> Result<GpxMetadata> {
    let mut md = GpxMetadata::default();

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"name" => {
                    md.name = Some(xml_reader.read_inner_as_string()?);
                }
                b"desc" => {
                    md.description = Some(xml_reader.read_inner_as_string()?);
                }
                b"time" => {
                    md.time = Some(xml_reader.read_inner_as_time()?);
                }
                // author, copyright, link, keywords, extensions.
                _ => xml_reader.skip_element(&e)?,
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"metadata" => {
                    return Ok(md);
                }
                _ => {}
            },
            // Self-closing elements such as <bounds .../>.
            Ok(Event::Empty(_)) | Ok(Event::Comment(_)) => {}
            e => bail!("Unexpected element {:?}", e),
        }
    }
}
