use crate::config::GenerateConfig;
use crate::generate::generate;
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// CLI for doc-stage: stage a packaged source tree and regenerate its docs.
#[derive(Parser)]
#[clap(
    name = "doc-stage",
    version,
    about = "Stage a versioned package source tree and regenerate its API documentation"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Regenerate documentation output from the packaged source tree
    Generate {
        /// Path to the YAML config file; built-in defaults when omitted
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate { config } => {
            let config = match config {
                Some(path) => load_config(path)?,
                None => {
                    info!("No config file given, using built-in defaults");
                    GenerateConfig::default()
                }
            };
            config.trace_loaded();
            println!("Documentation regeneration starting...");
            match generate(&config).await {
                Ok(report) => {
                    println!("Documentation regeneration complete.\nReport:");
                    println!("{:#?}", report);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Documentation regeneration failed: {}", e);
                    Err(e.into())
                }
            }
        }
    }
}
