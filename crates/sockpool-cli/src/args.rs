//! Command-line arguments for the `sockpool` binary

use std::path::PathBuf;

use clap::Parser;

/// Exercise a TCP connection pool against a remote endpoint
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to connect to, e.g. 127.0.0.1:6379 (overrides config file)
    #[arg(short, long, env = "SOCKPOOL_ADDR")]
    pub addr: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "SOCKPOOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Connections created eagerly (overrides config file)
    #[arg(long, env = "SOCKPOOL_MIN")]
    pub min: Option<usize>,

    /// Maximum live connections (overrides config file)
    #[arg(long, env = "SOCKPOOL_MAX")]
    pub max: Option<usize>,

    /// Acquire timeout in milliseconds (overrides config file)
    #[arg(long, env = "SOCKPOOL_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Connect timeout in milliseconds for each dial
    #[arg(long, env = "SOCKPOOL_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Number of concurrent workers
    #[arg(short, long, default_value = "4", env = "SOCKPOOL_WORKERS")]
    pub workers: usize,

    /// Checkout/return cycles per worker
    #[arg(short, long, default_value = "10", env = "SOCKPOOL_ROUNDS")]
    pub rounds: usize,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info", env = "SOCKPOOL_LOG_LEVEL")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["sockpool"]).unwrap();
        assert!(args.addr.is_none());
        assert!(args.config.is_none());
        assert_eq!(args.workers, 4);
        assert_eq!(args.rounds, 10);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_args_flags() {
        let args = Args::try_parse_from([
            "sockpool",
            "--addr",
            "127.0.0.1:7000",
            "--min",
            "2",
            "--max",
            "8",
            "--timeout-ms",
            "250",
            "--workers",
            "16",
            "--rounds",
            "3",
        ])
        .unwrap();

        assert_eq!(args.addr.as_deref(), Some("127.0.0.1:7000"));
        assert_eq!(args.min, Some(2));
        assert_eq!(args.max, Some(8));
        assert_eq!(args.timeout_ms, Some(250));
        assert_eq!(args.workers, 16);
        assert_eq!(args.rounds, 3);
    }

    #[test]
    fn test_args_rejects_negative_size() {
        assert!(Args::try_parse_from(["sockpool", "--max", "-1"]).is_err());
    }
}
