//! Mutation Browser service
//!
//! Query service over a genomic-variant table with an asynchronous audit
//! log: `serve` runs the HTTP API, `worker` runs the query-event consumer
//! against a redis broker, `check` probes configuration and connectivity.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use mutation_browser::config::ServiceConfig;
use mutation_browser::queue::{JobQueue, MemoryQueue, RedisQueue};
use mutation_browser::service::server::{create_app, AppState};
use mutation_browser::store::{EventStore, PgStore, VariantStore};
use mutation_browser::worker;

#[derive(Parser)]
#[command(name = "mutation-browser")]
#[command(about = "Genomic variant query service with asynchronous audit logging")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        /// Override host address
        #[arg(long)]
        host: Option<String>,

        /// Override port
        #[arg(short, long)]
        port: Option<u16>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long, default_value = "info")]
        log_level: String,
    },

    /// Run the query-event worker
    Worker {
        /// Log level (trace, debug, info, warn, error)
        #[arg(long, default_value = "info")]
        log_level: String,
    },

    /// Check configuration and backend connectivity
    Check {
        /// Log level (trace, debug, info, warn, error)
        #[arg(long, default_value = "warn")]
        log_level: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            log_level,
        } => serve_command(host, port, log_level).await,
        Commands::Worker { log_level } => worker_command(log_level).await,
        Commands::Check { log_level } => check_command(log_level).await,
    }
}

async fn serve_command(
    host_override: Option<String>,
    port_override: Option<u16>,
    log_level: String,
) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&log_level)?;

    info!("Starting mutation-browser service");

    let mut config = ServiceConfig::from_env()?;

    if let Some(host) = host_override {
        config.server.host = host;
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }

    info!(
        "Database: {}@{}:{}/{}",
        config.database.user, config.database.host, config.database.port, config.database.name
    );
    info!("Broker: {}", config.queue.broker_url);

    let store = Arc::new(PgStore::connect(&config.database));
    let variants: Arc<dyn VariantStore> = store.clone();
    let events: Arc<dyn EventStore> = store.clone();
    let queue = build_queue(&config)?;

    // With the in-process broker the worker has to live here; with redis
    // it runs as its own `worker` process.
    if config.queue.is_memory_broker() {
        info!("Memory broker configured; running worker in-process");
        worker::spawn(queue.clone(), events.clone());
    }

    let state = AppState {
        variants,
        events,
        queue,
        config: Arc::new(config.clone()),
    };
    let app = create_app(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mutation browser listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn worker_command(log_level: String) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&log_level)?;

    let config = ServiceConfig::from_env()?;
    config.validate()?;

    if config.queue.is_memory_broker() {
        return Err(
            "Memory broker jobs never leave the serve process; a standalone worker \
             needs a redis:// broker URL"
                .into(),
        );
    }

    let store = Arc::new(PgStore::connect(&config.database));
    let events: Arc<dyn EventStore> = store;
    let queue = build_queue(&config)?;

    worker::run(queue, events).await;

    Ok(())
}

async fn check_command(log_level: String) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&log_level)?;

    let config = ServiceConfig::from_env()?;

    println!("Effective configuration:");
    println!("  server:   {}:{}", config.server.host, config.server.port);
    println!(
        "  database: {}@{}:{}/{}",
        config.database.user, config.database.host, config.database.port, config.database.name
    );
    println!("  broker:   {}", config.queue.broker_url);
    println!("  backend:  {}", config.queue.result_backend);

    match config.validate() {
        Ok(()) => println!("Configuration is valid"),
        Err(e) => {
            println!("Configuration validation failed: {}", e);
            return Err(e.into());
        }
    }

    let store = PgStore::connect(&config.database);
    match store.ping().await {
        Ok(()) => println!("  OK database: reachable"),
        Err(e) => println!("  ERROR database: {}", e),
    }

    if config.queue.is_memory_broker() {
        println!("  OK broker: in-process memory queue");
    } else {
        match RedisQueue::new(&config.queue.broker_url, &config.queue.result_backend) {
            Ok(queue) => match queue.ping().await {
                Ok(()) => println!("  OK broker: reachable"),
                Err(e) => println!("  ERROR broker: {}", e),
            },
            Err(e) => println!("  ERROR broker: {}", e),
        }
    }

    Ok(())
}

fn build_queue(config: &ServiceConfig) -> Result<Arc<dyn JobQueue>, Box<dyn std::error::Error>> {
    if config.queue.is_memory_broker() {
        Ok(Arc::new(MemoryQueue::new()))
    } else {
        let queue = RedisQueue::new(&config.queue.broker_url, &config.queue.result_backend)?;
        Ok(Arc::new(queue))
    }
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    Ok(())
}
