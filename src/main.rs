use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use iplocator::addresses::{AddressBook, SameLocationClassifier, UdpProbeSource};
use iplocator::api::{health_routes, location_routes};
use iplocator::cache::CacheFactory;
use iplocator::config::AppConfig;
use iplocator::fetch::{HttpFetcher, UreqFetcher};
use iplocator::providers::ProviderChain;
use iplocator::repository::{LocationRepository, RepositoryFactory};
use iplocator::services::LocationService;
use iplocator::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = AppConfig::load();
    let _guard = init_logging(&config.logging);

    // Storage and cache
    let repository: Arc<dyn LocationRepository> = RepositoryFactory::create(&config.database)
        .await
        .expect("Failed to create repository");
    let cache = CacheFactory::create(&config.cache).expect("Failed to create cache");

    // One-shot address discovery
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(UreqFetcher);
    let addresses = Arc::new(AddressBook::new());
    let shutdown = CancellationToken::new();
    Arc::clone(&addresses)
        .discover(Arc::clone(&fetcher), &UdpProbeSource, &shutdown)
        .await;

    let classifier = SameLocationClassifier::new(
        &config.location.same_location_regex,
        Arc::clone(&addresses),
    )
    .expect("Invalid same-location pattern");

    let providers = ProviderChain::new(
        &config.providers,
        &config.location.first_provider,
        &config.location.second_provider,
        Arc::clone(&fetcher),
    );

    info!("Providers: {}", providers.provider_names().join(", "));
    info!("First provider: {}", providers.first_provider());
    info!("Second provider: {}", providers.second_provider());
    info!(
        "Expression of Same Location (Regex): {}",
        config.location.same_location_regex
    );
    info!(
        "Public addresses: {:?} - Local addresses: {:?}",
        addresses.public_addresses(),
        addresses.local_addresses()
    );

    let service = Arc::new(LocationService::new(
        Arc::clone(&repository),
        cache,
        providers,
        classifier,
        Arc::clone(&addresses),
        config.location.stale_after_days,
    ));

    // Self check against the first public address; failure does not
    // abort startup
    match service.resolve_current_location(None, &shutdown).await {
        Ok(location) => info!(
            "Current location: {}, {}, {}",
            location.city, location.region, location.country
        ),
        Err(e) => error!("Error occurred while fetching current location: {}", e),
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    let workers = config.server.cpu_count;
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&service)))
            .app_data(web::Data::new(Arc::clone(&repository)))
            .configure(location_routes)
            .configure(health_routes)
    })
    .workers(workers)
    .bind(bind_address)?
    .run()
    .await
}
