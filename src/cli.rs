//! CLI arguments for the `vault-model` binary.

use {clap::Parser, std::path::PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Simulates a batch of Balancer V2 vault operations")]
pub struct Args {
    /// The log filter.
    #[arg(long, env, default_value = "warn,vault_model=info")]
    pub log: String,

    /// Path to the TOML configuration file.
    #[arg(long, env)]
    pub config: PathBuf,

    /// Path to a JSON file with the list of calls to simulate, in order.
    #[arg(long)]
    pub batch: PathBuf,

    /// Refetch pools even if they are cached.
    #[arg(long)]
    pub refresh: bool,

    /// Print the collected Prometheus metrics to stderr when done.
    #[arg(long)]
    pub metrics: bool,
}
