use thiserror::Error;

/// Everything that can go wrong while talking to the geocoder
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, DNS or request-building failure from the HTTP client
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The body was requested as JSON but did not parse
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    /// The XML reader rejected the body
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    /// The body parsed as XML events but does not form a single-rooted document
    #[error("malformed XML document: {0}")]
    MalformedXml(&'static str),
    /// Valid JSON that lacks the expected nesting, e.g. an error payload
    #[error("missing `{path}` in geocoder response")]
    MissingField { path: &'static str },
    #[error("unknown language code '{0}'")]
    UnknownLanguage(String),
    /// Reserved for format validation. No request path produces it.
    #[error("incorrect format '{0}'")]
    IncorrectFormat(String),
}
