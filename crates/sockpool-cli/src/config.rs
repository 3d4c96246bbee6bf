//! Configuration file loading and flag merging

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sockpool_pool::PoolConfig;

use crate::args::Args;

/// Contents of a `sockpool` TOML file
///
/// ```toml
/// addr = "127.0.0.1:6379"
/// connect_timeout_ms = 1000
///
/// [pool]
/// min_size = 2
/// max_size = 8
/// acquire_timeout_ms = 500
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub pool: Option<PoolConfig>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Fully resolved settings for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub addr: String,
    pub connect_timeout: Option<Duration>,
    pub pool: PoolConfig,
}

impl CliConfig {
    /// Merge flags over an optional file; flags win
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self> {
        let Some(addr) = args.addr.clone().or(file.addr) else {
            bail!("no address given: pass --addr or set `addr` in the config file");
        };

        let base = file.pool.unwrap_or_default();
        let mut pool = PoolConfig::new(
            args.min.unwrap_or(base.min_size()),
            args.max.unwrap_or(base.max_size()),
        );
        let timeout_ms = args
            .timeout_ms
            .or_else(|| base.acquire_timeout().map(|t| t.as_millis() as u64));
        if let Some(ms) = timeout_ms {
            pool = pool.with_acquire_timeout_ms(ms);
        }
        pool.validate().context("Invalid pool bounds")?;

        let connect_timeout = args
            .connect_timeout_ms
            .or(file.connect_timeout_ms)
            .map(Duration::from_millis);

        Ok(Self {
            addr,
            connect_timeout,
            pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["sockpool"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_full_file() {
        let file = FileConfig::parse(
            r#"
            addr = "10.0.0.1:5432"
            connect_timeout_ms = 750

            [pool]
            min_size = 2
            max_size = 8
            acquire_timeout_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(
            file,
            FileConfig {
                addr: Some("10.0.0.1:5432".into()),
                connect_timeout_ms: Some(750),
                pool: Some(PoolConfig::new(2, 8).with_acquire_timeout_ms(500)),
            }
        );
    }

    #[test]
    fn test_parse_empty_file() {
        assert_eq!(FileConfig::parse("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_parse_rejects_negative_size() {
        assert!(FileConfig::parse("[pool]\nmin_size = -1\nmax_size = 4\n").is_err());
    }

    #[test]
    fn test_resolve_from_file_only() {
        let file = FileConfig {
            addr: Some("10.0.0.1:5432".into()),
            connect_timeout_ms: Some(750),
            pool: Some(PoolConfig::new(2, 8).with_acquire_timeout_ms(500)),
        };

        let config = CliConfig::resolve(&args(&[]), file).unwrap();
        assert_eq!(config.addr, "10.0.0.1:5432");
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(750)));
        assert_eq!(config.pool, PoolConfig::new(2, 8).with_acquire_timeout_ms(500));
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            addr: Some("10.0.0.1:5432".into()),
            connect_timeout_ms: None,
            pool: Some(PoolConfig::new(2, 8).with_acquire_timeout_ms(500)),
        };

        let config = CliConfig::resolve(
            &args(&["--addr", "127.0.0.1:9000", "--max", "3", "--timeout-ms", "100"]),
            file,
        )
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.connect_timeout, None);
        assert_eq!(config.pool, PoolConfig::new(2, 3).with_acquire_timeout_ms(100));
    }

    #[test]
    fn test_defaults_without_file() {
        let config = CliConfig::resolve(&args(&["--addr", "localhost:1"]), FileConfig::default())
            .unwrap();
        assert_eq!(config.pool, PoolConfig::default());
        assert_eq!(config.pool.acquire_timeout(), None);
    }

    #[test]
    fn test_missing_addr_is_an_error() {
        let err = CliConfig::resolve(&args(&[]), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--addr"));
    }

    #[test]
    fn test_merged_bounds_are_validated() {
        let file = FileConfig {
            addr: Some("localhost:1".into()),
            connect_timeout_ms: None,
            pool: Some(PoolConfig::new(4, 8)),
        };
        assert!(CliConfig::resolve(&args(&["--max", "2"]), file).is_err());
    }
}
