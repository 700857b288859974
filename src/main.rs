use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use clap::{Parser, Subcommand};
use face_comparison::config::{LoggingSettings, Settings};
use face_comparison::core::{BatchDownloader, Comparator, Logger, TracingLogger};
use face_comparison::routes::{self, compare::AppState};
use face_comparison::services::{HttpImageFetcher, HttpRecognitionClient};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Grace period for in-flight requests on shutdown
const SHUTDOWN_TIMEOUT_SECS: u64 = 3;

/// Face identity comparison service.
#[derive(Parser)]
#[command(name = "face-comparison")]
struct Cli {
    /// Configuration file (default: config/default.toml, config/local.toml and FACECMP__ env vars).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the version and exit.
    Version,
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Command::Version) = cli.command {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("Configuration error: {}", e)))?;

    init_tracing(&settings.logging);

    info!("Starting face comparison service...");

    let fetcher = HttpImageFetcher::with_timeout(settings.download.timeout()).map_err(|e| {
        error!("Failed to build download client: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    let downloader = BatchDownloader::new(Arc::new(fetcher), logger.clone());
    let recognition = Arc::new(HttpRecognitionClient::new(&settings.recognition));

    info!("Recognition client initialized for {}", settings.recognition.endpoint);

    let app_state = AppState {
        comparator: Arc::new(Comparator::new(downloader, recognition, logger)),
        secret: settings.server.secret.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let compare_path = settings.server.compare_path.clone();

    info!("Starting HTTP server on {}:{} ({})", host, port, compare_path);

    HttpServer::new(move || {
        let compare_path = compare_path.clone();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(move |cfg| routes::configure_routes(cfg, &compare_path))
    })
    .workers(workers)
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .bind((host, port))?
    .run()
    .await
}
