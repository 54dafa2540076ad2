use crate::error::{Error, Result};

/// Default number of chunks carved out of the arena.
pub const DEFAULT_CHUNK_COUNT: usize = 1024;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Construction parameters for a blob pool.
///
/// Both values are fixed for the lifetime of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of chunks in the arena (default: 1024)
    pub chunk_count: usize,

    /// Size of every chunk in bytes (default: 4096)
    pub chunk_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            chunk_count: DEFAULT_CHUNK_COUNT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl PoolConfig {
    /// Create a config with explicit chunk count and size.
    pub fn new(chunk_count: usize, chunk_size: usize) -> Self {
        Self {
            chunk_count,
            chunk_size,
        }
    }

    /// Total arena size in bytes, or `None` on overflow.
    pub fn arena_size(&self) -> Option<usize> {
        self.chunk_count.checked_mul(self.chunk_size)
    }

    /// Check the parameters describe a usable arena.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_count == 0 {
            return Err(Error::InvalidConfig("chunk_count must be non-zero".into()));
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be non-zero".into()));
        }
        if self.arena_size().is_none() {
            return Err(Error::InvalidConfig(format!(
                "arena of {} x {} bytes overflows usize",
                self.chunk_count, self.chunk_size
            )));
        }
        Ok(())
    }
}
