// CLI module for twinrag
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;
use std::path::PathBuf;

/// twinrag - monitored and cached RAG service for a professional digital twin
#[derive(Parser, Debug)]
#[command(name = "twinrag", version, about, long_about = None)]
pub struct Args {
    /// Config file (default: ~/.twinrag/config.toml)
    #[arg(short, long, env = "TWINRAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}
