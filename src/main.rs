use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus::api::router;
use campus::config::AppConfig;
use campus::services::{MetricsScheduler, SweepScheduler};
use campus::{build_state, completion_sweep, db};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "campus=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;
    db::migrate(&pool).await?;

    let calendar = config.term_calendar();
    info!(
        "current term: {} ({})",
        calendar.current_term(chrono::Utc::now().date_naive()),
        if calendar.is_pinned() { "pinned" } else { "from clock" }
    );

    let (state, publisher) = build_state(pool.clone(), &config);

    let sweep = SweepScheduler::new(completion_sweep(pool.clone(), &config), config.sweep_interval_secs);
    tokio::spawn(sweep.start());

    let metrics = MetricsScheduler::new(pool, publisher, config.metrics_interval_secs);
    tokio::spawn(metrics.start());

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
