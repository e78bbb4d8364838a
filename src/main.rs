//! Property Ledger CLI Application
//!
//! Runs the REST API server, a scripted demo, or prints the effective config.

use clap::{Parser, Subcommand};
use property_ledger::api::{create_router, ApiState};
use property_ledger::cli;
use property_ledger::core::LedgerEngine;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "property-ledger")]
#[command(version = "0.1.0")]
#[command(about = "A permissioned property-ownership ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// REST API server
    Api {
        #[command(subcommand)]
        action: ApiCommands,
    },

    /// Run a scripted scenario against the sample participants
    Demo {
        /// Seed for the miner lottery
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print the effective configuration
    Config {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ApiCommands {
    /// Start the REST API server
    Start {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed the genesis directory with the sample participants
        #[arg(long)]
        sample: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Api { ref action } => run_api_command(action),
        Commands::Demo { seed } => cli::cmd_demo(seed),
        Commands::Config { ref config } => {
            let config = cli::load_config(config.as_ref(), false, None)?;
            cli::cmd_config(&config)
        }
    }
}

fn run_api_command(action: &ApiCommands) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        match action {
            ApiCommands::Start {
                port,
                config,
                sample,
            } => {
                let config = cli::load_config(config.as_ref(), *sample, None)?;
                let ledger = LedgerEngine::from_config(&config)?;
                println!(
                    "📂 Ledger ready with {} participant(s), batch size {}",
                    ledger.participants().len(),
                    ledger.max_batch_size()
                );

                let app = create_router(ApiState::new(ledger));

                let addr = format!("0.0.0.0:{}", port);
                println!("🚀 REST API server starting on http://localhost:{}", port);
                println!();
                println!("📖 Available endpoints:");
                println!("   GET  /health                              - Health check");
                println!("   GET  /ws                                  - WebSocket updates");
                println!("   POST /api/participants                    - Register participant");
                println!("   GET  /api/participants/{{identity}}         - Participant holdings");
                println!("   GET  /api/directory                       - Ownership directory");
                println!("   POST /api/transactions                    - Submit transfer");
                println!("   GET  /api/transactions/pending            - Pending transfers");
                println!("   GET  /api/properties/{{property}}/history   - Property history");
                println!("   POST /api/mine                            - Run mining cycle");
                println!("   GET  /api/chain                           - Full chain");
                println!("   GET  /api/chain/blocks/{{index}}            - Get block");
                println!("   GET  /api/chain/validate                  - Validate chain");
                println!("   GET  /api/stats                           - Chain statistics");
                println!();

                tokio::spawn(async move {
                    tokio::signal::ctrl_c().await.ok();
                    println!("\n📴 Shutting down API server...");
                    std::process::exit(0);
                });

                let listener = tokio::net::TcpListener::bind(&addr).await?;
                axum::serve(listener, app).await?;
            }
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
