//! Arena-backed blob pooling.
//!
//! One contiguous arena is split into equal chunks at construction. Callers
//! lease a [`Blob`] over a chunk, encode into it, and release it; the pool
//! recycles both the chunk and the wrapper so the hot path never allocates.

mod arena;
mod blob;
mod blob_pool;
mod config;
mod pending;

pub use blob::{Blob, BOOL_TRUE, NULL_STRING_LEN};
pub use blob_pool::{BlobPool, PoolStats};
pub use config::{PoolConfig, DEFAULT_CHUNK_COUNT, DEFAULT_CHUNK_SIZE};
