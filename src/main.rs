use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use capacity_planner::{api, db};

#[derive(Parser)]
#[command(name = "cap")]
#[command(about = "Engineering resource allocation tracker")]
struct Cli {
    /// Path to the SQLite database (defaults to the platform data directory)
    #[arg(long, global = true, env = "CAPACITY_PLANNER_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "5000", env = "CAPACITY_PLANNER_PORT")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1", env = "CAPACITY_PLANNER_HOST")]
        host: String,
    },
    /// Apply database migrations and exit
    Migrate,
    /// Check whether a server is up
    Status {
        /// Base URL of the API
        #[arg(long, default_value = "http://127.0.0.1:5000/api/v1")]
        url: String,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "capacity_planner=debug,cap=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<db::Database> {
    let db = match path {
        Some(path) => db::Database::open(path)?,
        None => db::Database::open_default()?,
    };
    db.migrate().context("Failed to migrate database")?;
    Ok(db)
}

async fn serve(db: db::Database, host: &str, port: u16) -> anyhow::Result<()> {
    let app = api::create_router_with_config(db, api::SecurityConfig::from_env());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Capacity planner listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn status(url: &str) -> anyhow::Result<()> {
    let health = format!("{}/health", url.trim_end_matches('/'));
    match reqwest::get(&health).await {
        Ok(response) if response.status().is_success() => {
            println!("Server is up at {}", url);
        }
        Ok(response) => {
            println!("Server at {} answered {}", url, response.status());
        }
        Err(e) => {
            tracing::debug!("Health check failed: {}", e);
            println!("Server is not reachable at {}", url);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, host }) => {
            let db = open_database(cli.db)?;
            serve(db, &host, port).await?;
        }
        Some(Commands::Migrate) => {
            open_database(cli.db)?;
            tracing::info!("Database is up to date");
        }
        Some(Commands::Status { url }) => {
            status(&url).await?;
        }
        None => {
            let db = open_database(cli.db)?;
            serve(db, "127.0.0.1", 5000).await?;
        }
    }

    Ok(())
}
