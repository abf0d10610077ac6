//! Runnable haven server
//!
//! ```sh
//! cargo run --example server -- haven.yaml
//! RUST_LOG=haven=debug cargo run --example server --features all
//! ```
//!
//! With the in-memory backend a few lodgings are seeded so that search and
//! booking can be tried straight away. Payment intents created against the
//! in-memory gateway never complete on their own.

use haven::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,haven=debug".into()),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => HavenConfig::from_yaml_file(&path)?,
        None => HavenConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;

    let seed = config.storage.backend == StorageBackend::InMemory;
    let mut builder = ServerBuilder::from_config(config).await?;

    if seed {
        let store = InMemoryLodgingStore::new();
        seed_lodgings(&store).await?;
        builder = builder.with_store(store);
    }

    builder.serve().await
}

async fn seed_lodgings(store: &InMemoryLodgingStore) -> Result<()> {
    let listings = [
        ("Harbour View", "Bristol", "United Kingdom", "Hotel", 120.0, 4, vec!["Free WiFi", "Parking"]),
        ("Old Town Loft", "Edinburgh", "United Kingdom", "Self Catering", 95.0, 3, vec!["Free WiFi"]),
        ("Cliffside Cabin", "St. Ives", "United Kingdom", "Cabin", 180.0, 5, vec!["Spa", "Parking"]),
        ("Canal House", "Amsterdam", "Netherlands", "Boutique", 210.0, 5, vec!["Free WiFi", "Spa"]),
        ("Budget Rooms", "Lisbon", "Portugal", "Budget", 45.0, 2, vec![]),
        ("Alfama Suites", "Lisbon", "Portugal", "Hotel", 130.0, 4, vec!["Free WiFi", "Fitness Center"]),
    ];

    let count = listings.len();
    for (name, city, country, kind, price, stars, facilities) in listings {
        let listing = NewLodging {
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            description: format!("{} in {}", kind, city),
            lodging_type: kind.to_string(),
            adult_count: 2,
            child_count: 2,
            facilities: facilities.into_iter().map(String::from).collect(),
            price_per_night: price,
            star_rating: stars,
            image_urls: vec![],
        };
        store.insert(listing.into_record("demo-host")).await?;
    }

    tracing::info!("seeded {} demo lodgings", count);
    Ok(())
}
