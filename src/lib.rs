#![warn(unreachable_pub, unused_qualifications)]

//! *An async Rust client for the Yandex Maps geocoder.*
//!
//! # Overview
//!
//! The client turns a point into the addresses and toponyms found there:
//!
//! - Filtering by toponym kind (house, street, metro, district, locality)
//! - Restricting the search to a bounding box
//! - Paging through results with count and offset
//! - Localised results in six languages
//! - JSON replies reduced to their feature members, XML replies kept as an ordered tree
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use yamaps_rs::types::{Language, Toponym};
//!
//! #[tokio::main]
//! async fn main() -> yamaps_rs::Result<()> {
//!     let client = yamaps_rs::Client::new("your-api-key");
//!
//!     let mut route = client.addresses_by_coordinates(37.617635, 55.755814);
//!     route.format("json");
//!     route.kind(Toponym::Metro);
//!     route.language(Language::EnglishRussia);
//!
//!     for feature in route.await?.features().unwrap_or_default() {
//!         println!("{feature}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Decoding
//!
//! Only the `json` format is decoded as JSON. Any other format, including
//! values the service does not recognise, is sent unchanged and the reply is
//! parsed as XML. Service errors are not translated: an XML error document is
//! returned like any other, and a JSON error body fails with
//! [Error::MissingField].

mod client;
mod error;
pub mod types;
mod xml;

pub type Result<T> = std::result::Result<T, Error>;

pub use client::{
    AddressesByCoordinates, Client, ClientConfig, ClientInner, GEOCODE_URL, Query, Request, Route,
};
pub use error::Error;
