use feedwell::orchestration::{ScheduleService, WellnessService};
use feedwell::quote::QuoteProvider;
use feedwell::{api, config::Config, db::init_db, HttpQuoteProvider, Repository, TimeMs};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let quotes: Arc<dyn QuoteProvider> =
        Arc::new(HttpQuoteProvider::new(config.quote_api_url.clone()));
    let schedule = Arc::new(ScheduleService::new(quotes));
    let wellness = Arc::new(WellnessService::new(
        repo.clone(),
        config.wellness_write_mode,
    ));

    if config.wellness_poll_secs > 0 {
        spawn_wellness_sweep(wellness.clone(), config.wellness_poll_secs);
    }

    let app = api::create_router(api::AppState::new(repo, schedule, wellness));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn spawn_wellness_sweep(wellness: Arc<WellnessService>, every_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(every_secs));
        loop {
            ticker.tick().await;
            if let Err(e) = wellness.recompute_all(TimeMs::now()).await {
                tracing::warn!(error = %e, "Wellness sweep failed");
            }
        }
    });
}
