#![allow(clippy::single_match)]

use std::{borrow::Cow, path::Path, str::FromStr};

use anyhow::{bail, Context, Result};
use gpx::{parse_gpx, parse_gpx_attributes};
use log::info;
use logging_timer::time;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use time::{format_description::well_known, OffsetDateTime};

use crate::gpx_model::GpxDocument;

mod attributes;
mod gpx;
mod metadata;
mod track;
mod track_segment;
mod trackpoint;
mod trackpoint_extensions;

/*
<xml>
<gpx>                          type="gpxType"          parse_gpx_attributes, parse_gpx
   <metadata>                  type="metadataType"     parse_metadata
   <wpt>                       type="wptType"          skipped
   <rte>                       type="rteType"          skipped
   <trk>                       type="trkType"          parse_track
       <trkseg>                type="trksegType"       parse_track_segment
           <trkpt>             type="wptType"          parse_trackpoint
               <extensions>    type="extensions"       parse_trackpoint_extensions
*/

/// The XSD, which defines the format of a GPX file, is at https://www.topografix.com/GPX/1/1/gpx.xsd
#[time]
pub fn read_gpx_from_file<P: AsRef<Path>>(input_file: P) -> Result<GpxDocument> {
    let input_file = input_file.as_ref();
    info!("Reading GPX file {:?}", input_file);
    let contents = std::fs::read(input_file)?;
    let mut gpx = read_gpx_from_slice(&contents)?;
    gpx.filename = Some(input_file.to_owned());
    Ok(gpx)
}

pub fn read_gpx_from_slice(data: &[u8]) -> Result<GpxDocument> {
    let mut xml_reader = Reader::from_reader(data);
    xml_reader.config_mut().trim_text(true);
    read_gpx_from_reader(xml_reader)
}

#[time]
fn read_gpx_from_reader(mut xml_reader: Reader<&[u8]>) -> Result<GpxDocument> {
    let mut gpx: Option<GpxDocument> = None;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"gpx" => {
                    let attrs = parse_gpx_attributes(&e, &xml_reader)?;
                    let mut partial_gpx = parse_gpx(&mut xml_reader)?;
                    partial_gpx.creator = attrs.creator;
                    partial_gpx.version = attrs.version;
                    gpx = Some(partial_gpx);
                }
                e => bail!("Unexpected Start element {:?}", xml_reader.bytes_to_cow(e)),
            },
            Ok(Event::Eof) => {
                // We should already have consumed the closing '</gpx>' tag in parse_gpx().
                // So the next thing will be EOF.
                return gpx.context("Did not find the 'gpx' element");
            }
            Err(e) => bail!("Error at position {}: {:?}", xml_reader.error_position(), e),
            _ => (),
        }
    }
}

pub(crate) trait XmlReaderConversions {
    fn bytes_to_cow<'a, 'b>(&'a self, bytes: &'b [u8]) -> Result<Cow<'b, str>>;
    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String>;
}

impl<R> XmlReaderConversions for Reader<R> {
    #[inline]
    fn bytes_to_cow<'a, 'b>(&'a self, bytes: &'b [u8]) -> Result<Cow<'b, str>> {
        Ok(self.decoder().decode(bytes)?)
    }

    #[inline]
    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String> {
        // Ensure everything goes through decode().
        Ok(self.bytes_to_cow(bytes)?.into())
    }
}

pub(crate) trait XmlReaderExtensions {
    fn read_inner_as_string(&mut self) -> Result<String>;
    fn read_inner_as_time(&mut self) -> Result<OffsetDateTime>;
    fn read_inner_as<T: FromStr>(&mut self) -> Result<T>;
    fn skip_element(&mut self, start: &BytesStart<'_>) -> Result<()>;
}

impl XmlReaderExtensions for Reader<&[u8]> {
    /// Reads the 'INNER TEXT' from a tag such as <tag>INNER TEXT</tag>,
    /// consuming the closing tag.
    fn read_inner_as_string(&mut self) -> Result<String> {
        let text = match self.read_event() {
            Ok(Event::Text(text)) => text.unescape()?.into_owned(),
            Ok(Event::CData(cdata)) => self.bytes_to_string(&cdata)?,
            // An empty element such as <name></name>.
            Ok(Event::End(_)) => return Ok(String::new()),
            e => bail!(
                "Got unexpected XML element {:?} (was expecting Event::Text), this is either a bug or the document is corrupt",
                e
            ),
        };

        match self.read_event() {
            Ok(Event::End(_)) => Ok(text),
            e => bail!("Expected a closing tag after {:?}, got {:?}", text, e),
        }
    }

    /// Reads a <time>2024-09-21T06:59:46.000Z</time> tag. The offset in the
    /// document is kept as-is.
    fn read_inner_as_time(&mut self) -> Result<OffsetDateTime> {
        let t = self.read_inner_as_string()?;
        OffsetDateTime::parse(&t, &well_known::Rfc3339)
            .with_context(|| format!("Could not parse {t:?} as an RFC 3339 time"))
    }

    fn read_inner_as<T: FromStr>(&mut self) -> Result<T> {
        let t = self.read_inner_as_string()?;

        match t.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => bail!("Could not parse {} into {}", t, std::any::type_name::<T>()),
        }
    }

    /// Skips an element we have no interest in, including all of its children.
    fn skip_element(&mut self, start: &BytesStart<'_>) -> Result<()> {
        self.read_to_end(start.name())?;
        Ok(())
    }
}
