//! Geocoding against the live Radar API.
//!
//! This example shows how to:
//! - Build a client from `RADAR_API_KEY`
//! - Forward and reverse geocode
//! - Search for places and autocomplete
//! - Get a provider-agnostic result with the normalize helpers
//!
//! Run with: `RADAR_API_KEY=prj_test_sk_... cargo run --example geocode`

use radar_mapping_api::{
    Autocomplete, ClientBuilder, Error, ForwardGeocode, SearchPlaces, DEFAULT_COUNTRY,
    DEFAULT_REVERSE_LAYERS,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("radar_mapping_api=debug,geocode=info")
        .init();

    let client = ClientBuilder::from_env()?.build()?;

    println!("=== Forward Geocode ===");
    let response = client
        .forward_geocode(&ForwardGeocode::new("841 Broadway, New York, NY"))
        .await?;
    for address in &response.addresses {
        println!(
            "{} [{}] confidence={:?}",
            address.formatted_address, address.layer, address.confidence
        );
        if let Some(tz) = &address.time_zone {
            println!("  time zone: {} ({})", tz.name, tz.current_time);
        }
    }
    println!();

    println!("=== Place Search ===");
    let places = client
        .search_places(
            &SearchPlaces::near("40.7342,-73.9912")
                .chains("starbucks")
                .radius(5000)
                .limit(5),
        )
        .await?;
    for place in &places.places {
        println!("{} {:?}", place.name, place.categories);
    }
    println!();

    println!("=== Autocomplete ===");
    let suggestions = client
        .autocomplete(&Autocomplete::new("841 Broadw").near("40.7342,-73.9912").limit(3))
        .await?;
    for address in &suggestions.addresses {
        println!("{}", address.formatted_address);
    }
    println!();

    println!("=== Normalized ===");
    match client.normalize_by_postal_code("10003", DEFAULT_COUNTRY).await? {
        Some(result) => println!("10003 -> {:?}", result),
        None => println!("10003 -> no match"),
    }
    let here = client
        .normalize_by_coordinates(40.7342, -73.9912, DEFAULT_REVERSE_LAYERS)
        .await?;
    println!("40.7342,-73.9912 -> {:?}", here);

    Ok(())
}
