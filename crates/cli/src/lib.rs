use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fxgate")]
#[command(about = "fxgate - FX volatility market-data gateway")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway with the given configuration
    Start {
        /// Path to the configuration file
        #[arg(short, long, default_value = "fxgate.yaml")]
        config: PathBuf,

        /// Override HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate configuration without starting the gateway
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "fxgate.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "fxgate.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
