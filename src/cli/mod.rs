mod sample;

pub use sample::print_sample;

use clap::{Parser, Subcommand};

/// Traffic Monitor Server - live detection stream and dashboard API
#[derive(Parser)]
#[command(name = "traffic-monitor-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the server (default)
    Serve,

    /// Print generated stream events as JSON lines without starting the server
    Sample {
        /// Number of ticks to generate
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// Seed for a reproducible sequence
        #[arg(short, long)]
        seed: Option<u64>,
    },
}
