mod client;
mod config;
mod server;
mod telemetry;

use clap::{Parser, Subcommand};
use config::Config;
use server::run_server;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub mod pb {
    tonic::include_proto!("s3file");
}

#[derive(Parser)]
#[command(name = "s3g")]
#[command(about = "gRPC gateway storing image objects in an S3-compatible object store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway (configured from the environment)
    Serve,
    /// Upload a file as an image object
    Put {
        /// Gateway gRPC address
        #[arg(long, default_value = "127.0.0.1:9090")]
        addr: String,

        /// Image id
        #[arg(long)]
        id: u64,

        /// File to upload
        #[arg(long)]
        file: PathBuf,
    },
    /// Download an image object
    Get {
        /// Gateway gRPC address
        #[arg(long, default_value = "127.0.0.1:9090")]
        addr: String,

        /// Image id
        #[arg(long)]
        id: u64,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3g=info,s3g_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let cfg = match Config::from_env() {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Failed to get config: {}", e);
                    std::process::exit(1);
                }
            };
            tracing::info!("Starting s3g with config: {:?}", cfg);

            let metrics = match telemetry::install_recorder() {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::error!("Failed to set up metrics: {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = run_server(cfg, metrics).await {
                tracing::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Put { addr, id, file } => match client::put_file(&addr, id, &file).await {
            Ok(size) => tracing::info!("Uploaded {:?} as image {} ({} bytes)", file, id, size),
            Err(e) => {
                tracing::error!("Put failed: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Get { addr, id, output } => {
            match client::get_to(&addr, id, output.as_deref()).await {
                Ok(size) => tracing::info!("Fetched image {} ({} bytes)", id, size),
                Err(e) => {
                    tracing::error!("Get failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
