//! Contiguous byte region backing every chunk of a pool.
//!
//! The region is allocated once as a single zeroed `BytesMut` and split into
//! equal chunks with `split_to`. Every chunk is its own `BytesMut` over a
//! disjoint range of that allocation, so a lease owns its bytes outright and
//! moves them around with its wrapper.

use bytes::BytesMut;

/// One fixed-size range of the arena and its byte offset.
#[derive(Debug)]
pub(crate) struct Chunk {
    offset: usize,
    data: BytesMut,
}

impl Chunk {
    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Split into offset and bytes.
    #[inline]
    pub(crate) fn into_parts(self) -> (usize, BytesMut) {
        (self.offset, self.data)
    }

    #[inline]
    pub(crate) fn from_parts(offset: usize, data: BytesMut) -> Self {
        Self { offset, data }
    }
}

/// Geometry of one `chunk_count * chunk_size` region.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Arena {
    chunk_size: usize,
    chunk_count: usize,
}

impl Arena {
    /// The caller has already validated the size.
    pub(crate) fn new(chunk_count: usize, chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunk_count,
        }
    }

    /// Size of every chunk in bytes.
    #[inline]
    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks carved from the arena.
    #[inline]
    pub(crate) fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Allocate the region and split it, lowest offset first.
    pub(crate) fn carve(&self) -> Vec<Chunk> {
        let mut region = BytesMut::zeroed(self.chunk_count * self.chunk_size);
        (0..self.chunk_count)
            .map(|i| Chunk {
                offset: i * self.chunk_size,
                data: region.split_to(self.chunk_size),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_layout() {
        let chunks = Arena::new(4, 16).carve();
        let offsets: Vec<_> = chunks.iter().map(Chunk::offset).collect();
        assert_eq!(offsets, vec![0, 16, 32, 48]);
        assert!(chunks.iter().all(|c| c.data.len() == 16));
        assert!(chunks.iter().all(|c| c.data.iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_chunks_share_one_region() {
        let chunks = Arena::new(3, 8).carve();
        let base = chunks[0].data.as_ptr() as usize;
        for chunk in &chunks {
            assert_eq!(chunk.data.as_ptr() as usize - base, chunk.offset());
        }
    }

    #[test]
    fn test_chunks_are_disjoint() {
        let mut chunks = Arena::new(2, 8).carve();
        chunks[0].data.fill(0xaa);
        chunks[1].data.fill(0x55);
        assert!(chunks[0].data.iter().all(|&b| b == 0xaa));
        assert!(chunks[1].data.iter().all(|&b| b == 0x55));
    }
}
