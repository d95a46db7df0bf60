use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The errors that can stop an activity from being imported or analysed.
/// All of them reject the activity as a whole.
#[derive(Error, Debug)]
pub enum Error {
    /// A point lacks one or more fields that the builder cannot do without.
    #[error("point {point_no} is missing mandatory fields: {}", .fields.join(", "))]
    MissingFields {
        point_no: u32,
        fields: Vec<&'static str>,
    },

    /// Any other violation of the input contract, such as an empty point
    /// sequence or laps supplied out of order.
    #[error("schema violation: {0}")]
    Schema(String),

    /// The source document or binary stream could not be decoded.
    #[error("could not parse {format} data")]
    Parse {
        format: SourceFormat,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse<E>(format: SourceFormat, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Parse {
            format,
            source: source.into(),
        }
    }

    /// True for both kinds of schema error.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::MissingFields { .. } | Error::Schema(_))
    }
}

/// The two families of input file that we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// GPX 1.1 XML track files.
    Xml,
    /// FIT files written by fitness devices.
    Binary,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Xml => write!(f, "GPX"),
            SourceFormat::Binary => write!(f, "FIT"),
        }
    }
}
