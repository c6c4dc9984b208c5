//! Command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::admin::DEFAULT_ADMIN_SECRET;
use crate::instrumentation::LogFormat;

/// Island builder quiz server
#[derive(Parser, Debug, Clone)]
#[command(name = "island-builder")]
#[command(about = "WebSocket server for the island builder quiz game")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "ISLAND_LISTEN", default_value = "127.0.0.1:9100")]
    pub listen: SocketAddr,

    /// JSON file with the initial team, blueprints and questions
    #[arg(long, env = "ISLAND_SEED", default_value = "data/seed.json")]
    pub seed: PathBuf,

    /// Password for the question import console
    #[arg(long, env = "ISLAND_ADMIN_SECRET", default_value = DEFAULT_ADMIN_SECRET)]
    pub admin_secret: String,

    /// Log output format
    #[arg(long, env = "ISLAND_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "island-builder",
            "--listen",
            "0.0.0.0:8000",
            "--seed",
            "seed.json",
            "--admin-secret",
            "hunter2",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.listen, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(args.seed, PathBuf::from("seed.json"));
        assert_eq!(args.admin_secret, "hunter2");
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(Args::try_parse_from(["island-builder", "--listen", "nowhere"]).is_err());
    }
}
