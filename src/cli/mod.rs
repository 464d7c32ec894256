//! CLI argument parsing

use std::time::Duration;

use clap::Parser;

use loadgen_core::{DriverConfig, LoadConfig};

/// Paced load generator: drives parallel connections against a server at a
/// target per-connection call rate and reports per-call outcomes.
#[derive(Parser, Debug)]
#[command(name = "loadgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Calls per second issued on each connection
    #[arg(short, long, default_value_t = 10)]
    pub qps: u32,

    /// Number of parallel connections
    #[arg(short, long, default_value_t = 1)]
    pub connections: usize,

    /// Run duration in seconds
    #[arg(short, long, default_value_t = 60)]
    pub duration: u64,

    /// Per-call timeout in seconds
    #[arg(short = 't', long, default_value_t = 2)]
    pub call_timeout: u64,

    /// Driver to generate load with
    #[arg(long, default_value = "noop")]
    pub driver: String,

    /// Server to connect to
    #[arg(long, default_value = "127.0.0.1")]
    pub server: String,

    /// Port to connect to
    #[arg(long, default_value_t = 50051)]
    pub port: u16,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Engine configuration derived from the flags
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig::new(self.connections, self.qps)
            .with_duration(Duration::from_secs(self.duration))
            .with_call_timeout(Duration::from_secs(self.call_timeout))
    }

    /// Driver selection options derived from the flags
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            host: self.server.clone(),
            port: self.port,
        }
    }
}
