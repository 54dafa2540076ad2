use crate::pool::PoolConfig;
use clap::Parser;

/// blob-pool - soak driver for the arena-backed blob pool
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Number of chunks in the arena
    #[arg(short, long, default_value = "64")]
    pub chunks: usize,

    /// Size of each chunk in bytes
    #[arg(long, default_value = "4096")]
    pub chunk_size: usize,

    /// Number of concurrent worker tasks
    #[arg(short, long, default_value = "16")]
    pub workers: usize,

    /// Acquire/write/release cycles per worker
    #[arg(short, long, default_value = "10000")]
    pub iterations: usize,

    /// Payload string written into every frame
    #[arg(long, default_value = "The quick brown fox jumps over the lazy dog")]
    pub payload: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse_args() -> Self {
        Config::parse()
    }

    /// Pool construction parameters derived from the CLI flags
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.chunks, self.chunk_size)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunks: 64,
            chunk_size: 4096,
            workers: 16,
            iterations: 10_000,
            payload: "The quick brown fox jumps over the lazy dog".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let config = Config::parse_from([
            "blob-pool",
            "--chunks",
            "8",
            "--chunk-size",
            "128",
            "--workers",
            "2",
        ]);
        assert_eq!(config.pool_config(), PoolConfig::new(8, 128));
        assert_eq!(config.workers, 2);
        assert_eq!(config.iterations, 10_000);
    }

    #[test]
    fn test_default_matches_cli_defaults() {
        let parsed = Config::parse_from(["blob-pool"]);
        let default = Config::default();
        assert_eq!(parsed.pool_config(), default.pool_config());
        assert_eq!(parsed.payload, default.payload);
    }
}
