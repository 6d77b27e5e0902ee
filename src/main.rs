use anyhow::{Context, Result};
use hotel_booking::api::image_host::{CloudImageHost, ImageHost};
use hotel_booking::core::config::Config;
use hotel_booking::core::routes::build_router;
use hotel_booking::core::server;
use hotel_booking::core::startup::restore_from_wal;
use hotel_booking::core::state::AppState;
use hotel_booking::core::tracing_init::init_tracing;
use hotel_booking::wal::wal::Wal;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path).context(format!(
        "Failed to load configuration from '{}'. \
        If this is your first time running the service, copy config.example.toml to config.toml and adjust the values.",
        config_path.display()
    ))?;

    init_tracing(&config.logging);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        port = ?config.server.port,
        unix_socket = ?config.server.unix_socket,
        num_threads = config.server.num_threads,
        environment = config.server.environment.as_str(),
        log_level = %config.logging.level,
        log_format = %config.logging.format,
        "Hotel booking API starting"
    );

    let wal_path = config.storage.wal_path.clone();
    let wal = Wal::new(wal_path.clone()).context("Failed to initialize WAL")?;
    info!(wal_path = %wal_path.display(), "WAL initialized");

    let image_host: Arc<dyn ImageHost> = Arc::new(
        CloudImageHost::new(&config.image_host).context("Failed to create image host client")?,
    );

    let server_config = config.server.clone();
    let state = AppState::new(config, wal, image_host);

    restore_from_wal(&state)?;

    info!(
        users = state.users.len(),
        hotels = state.hotels.len(),
        max_files = state.config.uploads.max_files,
        max_file_size = state.config.uploads.max_file_size,
        "Hotel booking API startup complete"
    );

    let app = server::with_middleware(build_router(Arc::new(state)), &server_config)?;
    server::run(app, &server_config).await
}
