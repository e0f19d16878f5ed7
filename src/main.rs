use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use buddy_match::config::{Settings, StoreBackend};
use buddy_match::core::Matcher;
use buddy_match::routes::{self, matches::AppState};
use buddy_match::services::{BuddyRepository, MemoryRowStore, RestRowStore, RowStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(settings: &Settings) {
    // LOG_LEVEL / LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    init_logging(&settings);

    info!("Starting Buddy Match service...");

    let store: Arc<dyn RowStore> = match settings.store.backend {
        StoreBackend::Rest => {
            let client = RestRowStore::new(
                settings.store.url.clone(),
                settings.store.api_key.clone(),
                settings.store.timeout_secs,
            )
            .map_err(|e| {
                error!("Failed to create backend client: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?;
            info!("REST row store initialized ({})", settings.store.url);
            Arc::new(client)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory row store; data is lost on restart");
            Arc::new(MemoryRowStore::new())
        }
    };

    let repository = BuddyRepository::new(store, settings.tables());

    let rules = settings.matching_rules();
    let matcher = Matcher::new(rules);

    info!(
        "Matcher initialized (min score: {}, default limit: {})",
        rules.min_score, rules.default_limit
    );

    let app_state = AppState {
        repository,
        matcher,
        max_limit: settings.matching.max_limit as usize,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::configure_extractors)
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
