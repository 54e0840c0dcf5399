//! Contains every type used in the library

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Kind of geographic object the results are filtered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toponym {
    House,
    Street,
    /// Metro station
    Metro,
    /// City district
    District,
    /// Town, city or village
    Locality,
}

impl Toponym {
    pub const ALL: [Toponym; 5] = [
        Toponym::House,
        Toponym::Street,
        Toponym::Metro,
        Toponym::District,
        Toponym::Locality,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Toponym::House => "house",
            Toponym::Street => "street",
            Toponym::Metro => "metro",
            Toponym::District => "district",
            Toponym::Locality => "locality",
        }
    }

    /// Looks up a kind by its wire name. Matching is exact.
    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|toponym| toponym.as_str() == kind)
    }
}

impl fmt::Display for Toponym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response format requested from the geocoder
///
/// Only [Format::Json] is decoded as JSON. Every other value, including
/// strings the service does not know, is sent as-is and decoded as XML.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Format {
    Json,
    #[default]
    Xml,
    Other(Box<str>),
}

impl Format {
    pub fn as_str(&self) -> &str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Other(format) => format,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Format::Json)
    }
}

impl From<&str> for Format {
    fn from(format: &str) -> Self {
        match format {
            "json" => Format::Json,
            "xml" => Format::Xml,
            other => Format::Other(other.into()),
        }
    }
}

impl From<String> for Format {
    fn from(format: String) -> Self {
        Format::from(format.as_str())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locale of the returned addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "ru_RU")]
    Russian,
    #[serde(rename = "uk_UA")]
    Ukrainian,
    #[serde(rename = "be_BY")]
    Belarusian,
    /// English names for objects in Russia
    #[serde(rename = "en_RU")]
    EnglishRussia,
    #[serde(rename = "en_US")]
    EnglishUsa,
    #[serde(rename = "tr_TR")]
    Turkish,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Russian,
        Language::Ukrainian,
        Language::Belarusian,
        Language::EnglishRussia,
        Language::EnglishUsa,
        Language::Turkish,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Language::Russian => "ru_RU",
            Language::Ukrainian => "uk_UA",
            Language::Belarusian => "be_BY",
            Language::EnglishRussia => "en_RU",
            Language::EnglishUsa => "en_US",
            Language::Turkish => "tr_TR",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|language| language.as_str() == code)
            .ok_or_else(|| Error::UnknownLanguage(code.into()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rectangle that restricts the search area
///
/// Serialized for the `bbox` parameter as `west,south-east,north`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([west, south, east, north]: [f64; 4]) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

impl From<(f64, f64, f64, f64)> for BoundingBox {
    fn from((west, south, east, north): (f64, f64, f64, f64)) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}-{},{}",
            Coordinate(self.west),
            Coordinate(self.south),
            Coordinate(self.east),
            Coordinate(self.north)
        )
    }
}

/// A coordinate as the geocoder expects it in `geocode` and `bbox`
///
/// Shortest round-trip digits, `.0` kept on whole numbers, exponents signed and
/// at least two digits wide (`1e-05`, `1e+16`), `nan`/`inf` in lowercase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Coordinate(pub(crate) f64);

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return f.write_str("nan");
        }
        if value.is_infinite() {
            return f.write_str(if value > 0.0 { "inf" } else { "-inf" });
        }

        // `{:?}` switches to exponent form below 1e-4 and from 1e16 up
        let repr = format!("{value:?}");
        match repr.split_once('e') {
            None => f.write_str(&repr),
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                write!(f, "{mantissa}e{sign}{digits:0>2}")
            }
        }
    }
}

const FEATURE_MEMBER_PATH: [&str; 3] = ["response", "GeoObjectCollection", "featureMember"];

/// Decoded body of a geocoder reply
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeResponse {
    /// Entries of `response.GeoObjectCollection.featureMember`
    Features(Vec<Value>),
    /// The whole XML document as an ordered tree
    Document(Map<String, Value>),
}

impl GeocodeResponse {
    /// Parses a JSON body and pulls out the feature members.
    ///
    /// Service error payloads lack the path and fail with [Error::MissingField].
    pub fn from_json(body: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(body)?;

        for key in FEATURE_MEMBER_PATH {
            value = match value {
                Value::Object(mut object) => object
                    .remove(key)
                    .ok_or(Error::MissingField { path: key })?,
                _ => return Err(Error::MissingField { path: key }),
            };
        }

        match value {
            Value::Array(features) => Ok(GeocodeResponse::Features(features)),
            _ => Err(Error::MissingField {
                path: "featureMember",
            }),
        }
    }

    /// Parses an XML body into a generic tree, whatever it contains.
    pub fn from_xml(body: &str) -> Result<Self> {
        crate::xml::parse(body).map(GeocodeResponse::Document)
    }

    pub fn features(&self) -> Option<&[Value]> {
        match self {
            GeocodeResponse::Features(features) => Some(features),
            GeocodeResponse::Document(_) => None,
        }
    }

    pub fn document(&self) -> Option<&Map<String, Value>> {
        match self {
            GeocodeResponse::Document(document) => Some(document),
            GeocodeResponse::Features(_) => None,
        }
    }

    pub fn into_features(self) -> Option<Vec<Value>> {
        match self {
            GeocodeResponse::Features(features) => Some(features),
            GeocodeResponse::Document(_) => None,
        }
    }

    pub fn into_document(self) -> Option<Map<String, Value>> {
        match self {
            GeocodeResponse::Document(document) => Some(document),
            GeocodeResponse::Features(_) => None,
        }
    }
}
