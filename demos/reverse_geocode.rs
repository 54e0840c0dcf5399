use tracing_subscriber::EnvFilter;
use yamaps_rs::types::{GeocodeResponse, Language};

// cargo run --example reverse_geocode -- <api-key> <longitude> <latitude> [kind] [format]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(key), Some(longitude), Some(latitude)) = (args.next(), args.next(), args.next())
    else {
        return Err("usage: reverse_geocode <api-key> <longitude> <latitude> [kind] [format]".into());
    };

    let client = yamaps_rs::Client::new(key);
    let mut route = client.addresses_by_coordinates(longitude.parse()?, latitude.parse()?);
    route.language(Language::EnglishRussia);
    if let Some(kind) = args.next() {
        route.toponym(&kind);
    }
    route.format(args.next().unwrap_or_else(|| "json".into()));

    match route.await? {
        GeocodeResponse::Features(features) => {
            for feature in &features {
                println!("{}", serde_json::to_string_pretty(feature)?);
            }
        }
        GeocodeResponse::Document(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?)
        }
    }

    Ok(())
}
