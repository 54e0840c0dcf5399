use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use futures::FutureExt as _;
use reqwest::Method;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use tracing::{Instrument as _, debug, debug_span, warn};

use crate::{
    Result,
    types::{BoundingBox, Coordinate, Format, GeocodeResponse, Language, Toponym},
};

pub const GEOCODE_URL: &str = "http://geocode-maps.yandex.ru/1.x/";

fn default_base_url() -> String {
    GEOCODE_URL.to_string()
}

/// Settings a [Client] is created with
///
/// The API key is redacted from `Debug` output and never logged.
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub api_key: SecretString,
    /// Geocoder endpoint (default: <http://geocode-maps.yandex.ru/1.x/>)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
        }
    }
}

/// A single call against the geocoder, executed by `.await`ing it
pub struct Route<T> {
    client: Client,
    kind: T,
}

impl<T> Route<T> {
    fn new(client: &Client, kind: T) -> Self {
        Self {
            client: client.clone(),
            kind,
        }
    }
}

impl<T: Request> Route<T> {
    fn build(&self) -> Result<reqwest::Request> {
        let mut query = Query::default();
        query.write_param("apikey", &self.client.config.api_key.expose_secret());
        self.kind.write_query(&mut query);

        let request = self
            .client
            .reqwest
            .request(T::METHOD, &self.client.config.base_url)
            .query(&query.pairs)
            .build()?;
        Ok(request)
    }

    /// The URL this route requests, API key included.
    pub fn url(&self) -> Result<reqwest::Url> {
        Ok(self.build()?.url().clone())
    }
}

impl<T: Request> IntoFuture for Route<T> {
    type Output = Result<T::Model>;
    type IntoFuture = futures::future::BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let span = debug_span!("geocode", request = ?self.kind);

        async move {
            let request = self.build()?;
            debug!("sending geocoder request");

            let response = self.client.reqwest.execute(request).await?;
            let status = response.status();
            if !status.is_success() {
                warn!(%status, "geocoder replied with a non-success status");
            }

            let body = response.text().await?;
            debug!(%status, bytes = body.len(), "geocoder response received");

            self.kind.decode(&body)
        }
        .instrument(span)
        .boxed()
    }
}

impl<T: fmt::Debug> fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("base_url", &self.client.config.base_url)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Deref for Route<AddressesByCoordinates> {
    type Target = AddressesByCoordinates;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

impl DerefMut for Route<AddressesByCoordinates> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.kind
    }
}

/// Async client for the Yandex Maps geocoder
///
/// Cloning is cheap: clones share the configuration and connection pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Deref for Client {
    type Target = ClientInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Stores the key as given. Nothing is validated or sent until a route is awaited.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self::with_config(ClientConfig::new(api_key))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            inner: ClientInner::new(config),
        }
    }

    /// Looks up the objects located at a point.
    ///
    /// Optional parameters are set on the returned route before awaiting it:
    ///
    /// ```rust,no_run
    /// # async fn run() -> yamaps_rs::Result<()> {
    /// let client = yamaps_rs::Client::new("api-key");
    /// let mut route = client.addresses_by_coordinates(37.617, 55.755);
    /// route.format("json");
    /// route.toponym("metro");
    /// let response = route.await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn addresses_by_coordinates(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> Route<AddressesByCoordinates> {
        Route::new(self, AddressesByCoordinates::new(longitude, latitude))
    }
}

pub struct ClientInner {
    reqwest: reqwest::Client,
    config: ClientConfig,
}

impl ClientInner {
    fn new(config: ClientConfig) -> Arc<Self> {
        Self {
            reqwest: reqwest::Client::new(),
            config,
        }
        .into()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Reverse geocoding: coordinates to addresses and toponyms
#[derive(Debug, Clone, PartialEq)]
pub struct AddressesByCoordinates {
    longitude: f64,
    latitude: f64,
    toponym: Option<Toponym>,
    border: Option<BoundingBox>,
    format: Format,
    count: u32,
    offset: u32,
    language: Language,
}

impl AddressesByCoordinates {
    pub const DEFAULT_COUNT: u32 = 10;

    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            toponym: None,
            border: None,
            format: Format::default(),
            count: Self::DEFAULT_COUNT,
            offset: 0,
            language: Language::default(),
        }
    }

    /// Filters results by kind name. Names other than the five known kinds
    /// are dropped and the query goes out unfiltered.
    pub fn toponym(&mut self, kind: &str) {
        self.toponym = Toponym::from_kind(kind);
        if self.toponym.is_none() {
            debug!(kind, "ignoring unrecognised toponym kind");
        }
    }

    pub fn kind(&mut self, toponym: Toponym) {
        self.toponym = Some(toponym);
    }

    /// Restricts results to `border`.
    pub fn border(&mut self, border: impl Into<BoundingBox>) {
        self.border = Some(border.into());
    }

    pub fn format(&mut self, format: impl Into<Format>) {
        self.format = format.into();
    }

    /// Maximum number of results.
    pub fn count(&mut self, count: u32) {
        self.count = count;
    }

    /// Number of results to skip.
    pub fn offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    pub fn language(&mut self, language: Language) {
        self.language = language;
    }

    /// The `geocode` term, `longitude,latitude`.
    pub fn geocode(&self) -> String {
        format!(
            "{},{}",
            Coordinate(self.longitude),
            Coordinate(self.latitude)
        )
    }
}

impl Request for AddressesByCoordinates {
    type Model = GeocodeResponse;

    const METHOD: Method = Method::GET;

    fn write_query(&self, query: &mut Query) {
        query.write_param("geocode", &self.geocode());
        query.write_param("format", &self.format);
        query.write_param("results", &self.count);
        query.write_param("skip", &self.offset);
        query.write_param("lang", &self.language);
        query.write_optional_param("kind", self.toponym.as_ref());
        if let Some(border) = &self.border {
            query.write_param("rspn", &1);
            query.write_param("bbox", border);
        }
    }

    fn decode(&self, body: &str) -> Result<Self::Model> {
        if self.format.is_json() {
            GeocodeResponse::from_json(body)
        } else {
            GeocodeResponse::from_xml(body)
        }
    }
}

/// Ordered query parameters, percent-encoded when the request is built
#[derive(Debug, Default)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn write_param(&mut self, key: &'static str, value: &impl fmt::Display) {
        self.pairs.push((key, value.to_string()));
    }

    pub fn write_optional_param(&mut self, key: &'static str, value: Option<&impl fmt::Display>) {
        if let Some(value) = value {
            self.write_param(key, value);
        }
    }
}

pub trait Request: fmt::Debug + Send + Sync + Sized + 'static {
    type Model: Send + 'static;

    const METHOD: Method;

    fn write_query(&self, query: &mut Query);

    fn decode(&self, body: &str) -> Result<Self::Model>;
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;
    use crate::Error;

    fn params(route: &Route<AddressesByCoordinates>) -> Vec<(String, String)> {
        route
            .url()
            .unwrap()
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    fn param(route: &Route<AddressesByCoordinates>, key: &str) -> Option<String> {
        params(route)
            .into_iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    #[test]
    fn defaults() {
        let client = Client::new("secret-key");
        let route = client.addresses_by_coordinates(37.611347, 55.760241);

        assert_eq!(
            params(&route),
            [
                ("apikey", "secret-key"),
                ("geocode", "37.611347,55.760241"),
                ("format", "xml"),
                ("results", "10"),
                ("skip", "0"),
                ("lang", "ru_RU"),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string()))
        );
        assert_eq!(route.url().unwrap().path(), "/1.x/");
    }

    #[test]
    fn geocode_is_not_rounded() {
        let client = Client::new("key");
        let route = client.addresses_by_coordinates(-0.000123456789, 89.99999999);
        assert_eq!(
            param(&route, "geocode").unwrap(),
            "-0.000123456789,89.99999999"
        );

        let route = client.addresses_by_coordinates(37.0, 55.0);
        assert_eq!(param(&route, "geocode").unwrap(), "37.0,55.0");

        let route = client.addresses_by_coordinates(0.00001, 1e16);
        assert_eq!(param(&route, "geocode").unwrap(), "1e-05,1e+16");
    }

    #[test]
    fn known_toponyms_are_sent() {
        let client = Client::new("key");
        for toponym in Toponym::ALL {
            let mut route = client.addresses_by_coordinates(30.3, 59.9);
            route.toponym(toponym.as_str());
            assert_eq!(param(&route, "kind").as_deref(), Some(toponym.as_str()));
        }
    }

    #[test]
    fn unknown_toponyms_are_dropped() {
        let client = Client::new("key");
        for kind in ["province", "HOUSE", "", "street "] {
            let mut route = client.addresses_by_coordinates(30.3, 59.9);
            route.toponym(kind);
            assert_eq!(param(&route, "kind"), None, "kind {kind:?}");
        }

        let mut route = client.addresses_by_coordinates(30.3, 59.9);
        route.kind(Toponym::Street);
        route.toponym("country");
        assert_eq!(param(&route, "kind"), None);
    }

    #[test]
    fn border_adds_bbox_and_rspn() {
        let client = Client::new("key");
        let mut route = client.addresses_by_coordinates(37.6, 55.7);
        assert_eq!(param(&route, "rspn"), None);
        assert_eq!(param(&route, "bbox"), None);

        route.border([37.5, 55.6, 37.75, 55.8]);
        assert_eq!(param(&route, "rspn").as_deref(), Some("1"));
        assert_eq!(
            param(&route, "bbox").as_deref(),
            Some("37.5,55.6-37.75,55.8")
        );
    }

    #[test]
    fn optional_parameters_are_passed_through() {
        let client = Client::new("key");
        let mut route = client.addresses_by_coordinates(37.6, 55.7);
        route.format("json");
        route.count(3);
        route.offset(20);
        route.language(Language::EnglishUsa);

        assert_eq!(param(&route, "format").as_deref(), Some("json"));
        assert_eq!(param(&route, "results").as_deref(), Some("3"));
        assert_eq!(param(&route, "skip").as_deref(), Some("20"));
        assert_eq!(param(&route, "lang").as_deref(), Some("en_US"));
    }

    #[test]
    fn unrecognised_format_is_sent_verbatim() {
        let client = Client::new("key");
        let mut route = client.addresses_by_coordinates(37.6, 55.7);
        route.format("geo json&x=1");
        assert_eq!(param(&route, "format").as_deref(), Some("geo json&x=1"));
        assert_eq!(param(&route, "x"), None);
    }

    #[test]
    fn decode_branches_on_json_only() {
        let mut request = AddressesByCoordinates::new(0.0, 0.0);
        request.format("json");
        let body = r#"{"response":{"GeoObjectCollection":{"featureMember":[]}}}"#;
        assert_eq!(
            request.decode(body).unwrap(),
            GeocodeResponse::Features(Vec::new())
        );

        for format in ["xml", "yaml", "JSON"] {
            request.format(format);
            assert!(matches!(
                request.decode("<a>1</a>").unwrap(),
                GeocodeResponse::Document(_)
            ));
        }
    }

    #[test]
    fn invalid_base_url_is_an_http_error() {
        let mut config = ClientConfig::new("key");
        config.base_url = "not a url".into();
        let client = Client::with_config(config);
        let route = client.addresses_by_coordinates(37.6, 55.7);
        assert!(matches!(route.url(), Err(Error::Http(_))));
    }

    #[test]
    fn api_key_is_redacted() {
        let client = Client::new("super-secret-key");
        let route = client.addresses_by_coordinates(37.6, 55.7);
        assert!(!format!("{client:?}").contains("super-secret-key"));
        assert!(!format!("{route:?}").contains("super-secret-key"));
        assert!(!format!("{:?}", client.config()).contains("super-secret-key"));
    }

    #[test]
    fn config_deserializes_with_default_endpoint() {
        let config: ClientConfig = serde_json::from_str(r#"{"api_key": "k"}"#).unwrap();
        assert_eq!(config.base_url, GEOCODE_URL);
        assert_eq!(config.api_key.expose_secret(), "k");
    }
}
