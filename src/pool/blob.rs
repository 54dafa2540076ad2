//! Cursor-addressed view over one arena chunk.
//!
//! A [`Blob`] writes and reads primitive values and strings sequentially,
//! little-endian throughout. Every operation is bounds-checked against the
//! chunk capacity before any byte is touched, so a failed operation leaves
//! both the bytes and the cursor where they were.
//!
//! Wire layout:
//!
//! | Type          | Bytes | Encoding                                   |
//! |---------------|-------|--------------------------------------------|
//! | bool          | 1     | `0x6F` = true, anything else false         |
//! | i16/u16       | 2     | little-endian                              |
//! | i32/u32       | 4     | little-endian                              |
//! | i64/u64       | 8     | little-endian                              |
//! | f32           | 4     | little-endian IEEE-754 bit pattern         |
//! | string        | 4 + N | i32 byte length, `-1` = null, then UTF-8   |
//! | fixed string  | N     | raw UTF-8, length known out of band        |

use std::fmt;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use super::arena::Chunk;
use super::blob_pool::Shared;
use crate::error::{Error, Result};

/// Byte written for `true`. Every other byte decodes as `false`.
pub const BOOL_TRUE: u8 = 0x6F;

/// Length prefix marking a null string.
pub const NULL_STRING_LEN: i32 = -1;

/// Width of a string length prefix.
const LEN_PREFIX: usize = 4;

/// Recyclable cursor state for one lease.
///
/// Created lazily by the pool, handed a chunk on every acquisition and parked
/// again without it on release. Never destroyed while the pool lives.
#[derive(Debug)]
pub(crate) struct BlobCore {
    id: usize,
    offset: usize,
    /// Chunk bytes; empty while the core is idle.
    data: BytesMut,
    cursor: usize,
    high_water_mark: usize,
    prefix_origin: usize,
}

impl BlobCore {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            offset: 0,
            data: BytesMut::new(),
            cursor: 0,
            high_water_mark: 0,
            prefix_origin: 0,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Take ownership of a chunk's bytes.
    pub(crate) fn attach(&mut self, chunk: Chunk) {
        let (offset, data) = chunk.into_parts();
        self.offset = offset;
        self.data = data;
    }

    /// Hand the chunk back, leaving the core idle.
    pub(crate) fn detach(&mut self) -> Chunk {
        let chunk = Chunk::from_parts(self.offset, std::mem::take(&mut self.data));
        self.offset = 0;
        chunk
    }

    /// Clear cursor state, keeping the chunk assignment.
    pub(crate) fn reset(&mut self) {
        self.cursor = 0;
        self.high_water_mark = 0;
        self.prefix_origin = 0;
    }

    /// Start of a `len`-byte range at the cursor, if it fits.
    #[inline]
    fn check(&self, skip: usize, len: usize) -> Result<usize> {
        let start = self.cursor + skip;
        match start.checked_add(len) {
            Some(end) if end <= self.capacity() => Ok(start),
            _ => Err(Error::OutOfRange {
                position: start,
                len,
                capacity: self.capacity(),
            }),
        }
    }

    #[inline]
    fn move_to(&mut self, position: usize) {
        self.cursor = position;
        if position > self.high_water_mark {
            self.high_water_mark = position;
        }
    }
}

/// Leased handle over one chunk of a [`BlobPool`](super::BlobPool) arena.
///
/// Dropping the blob releases it. [`Blob::release`] does the same explicitly
/// and is idempotent; every cursor operation on a released blob fails with
/// [`Error::Released`].
pub struct Blob {
    core: Option<Box<BlobCore>>,
    shared: Arc<Shared>,
}

impl Blob {
    pub(crate) fn new(core: Box<BlobCore>, shared: Arc<Shared>) -> Self {
        Self {
            core: Some(core),
            shared,
        }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    /// Detach the core without going through the release path.
    pub(crate) fn take_core(&mut self) -> Option<Box<BlobCore>> {
        self.core.take()
    }

    #[inline]
    fn core(&self) -> Result<&BlobCore> {
        self.core.as_deref().ok_or(Error::Released)
    }

    #[inline]
    fn core_mut(&mut self) -> Result<&mut BlobCore> {
        self.core.as_deref_mut().ok_or(Error::Released)
    }

    // === Lease state ===

    /// Stable identifier of the recycled wrapper behind this lease.
    pub fn id(&self) -> Option<usize> {
        self.core.as_ref().map(|c| c.id)
    }

    /// Byte offset of the chunk inside the arena (0 once released).
    pub fn offset(&self) -> usize {
        self.core.as_ref().map_or(0, |c| c.offset)
    }

    /// Chunk size in bytes (0 once released).
    pub fn capacity(&self) -> usize {
        self.core.as_ref().map_or(0, |c| c.capacity())
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.core.as_ref().map_or(0, |c| c.cursor)
    }

    /// Furthest cursor position reached since the lease started.
    pub fn high_water_mark(&self) -> usize {
        self.core.as_ref().map_or(0, |c| c.high_water_mark)
    }

    /// Logical zero point set by [`Blob::reserve_prefix`].
    pub fn prefix_origin(&self) -> usize {
        self.core.as_ref().map_or(0, |c| c.prefix_origin)
    }

    /// True once the lease went back to the pool.
    pub fn is_released(&self) -> bool {
        self.core.is_none()
    }

    /// Return the chunk to the pool. Only the first call has any effect.
    pub fn release(&mut self) {
        if let Some(core) = self.core.take() {
            self.shared.release_core(core);
        }
    }

    // === Cursor ===

    /// Move the cursor. Must stay within `[prefix_origin, capacity]`.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        let core = self.core_mut()?;
        if position > core.capacity() || position < core.prefix_origin {
            return Err(Error::OutOfRange {
                position,
                len: 0,
                capacity: core.capacity(),
            });
        }
        core.move_to(position);
        Ok(())
    }

    /// Seek to the prefix origin (absolute 0 when no prefix is reserved).
    pub fn seek_to_logical_start(&mut self) -> Result<()> {
        let core = self.core_mut()?;
        core.move_to(core.prefix_origin);
        Ok(())
    }

    /// Seek just past the last byte ever written.
    pub fn seek_to_high_water_mark(&mut self) -> Result<()> {
        let core = self.core_mut()?;
        core.move_to(core.high_water_mark);
        Ok(())
    }

    /// Reserve `[0, len)` for a header filled in later.
    ///
    /// Sets the prefix origin to `len` and seeks there, so following writes
    /// land after the reserved range.
    pub fn reserve_prefix(&mut self, len: usize) -> Result<()> {
        let core = self.core_mut()?;
        if len > core.capacity() {
            return Err(Error::OutOfRange {
                position: 0,
                len,
                capacity: core.capacity(),
            });
        }
        core.prefix_origin = len;
        core.move_to(len);
        Ok(())
    }

    /// Drop the reserved prefix and seek to absolute 0.
    ///
    /// Returns the previous prefix origin so the caller knows how much header
    /// space it has to fill.
    pub fn release_prefix(&mut self) -> Result<usize> {
        let core = self.core_mut()?;
        let old = core.prefix_origin;
        core.prefix_origin = 0;
        core.move_to(0);
        Ok(old)
    }

    // === Raw access ===

    fn put_slice(&mut self, src: &[u8]) -> Result<()> {
        let core = self.core_mut()?;
        let start = core.check(0, src.len())?;
        core.data[start..start + src.len()].copy_from_slice(src);
        core.move_to(start + src.len());
        Ok(())
    }

    /// Bytes `[cursor + skip, cursor + skip + len)` without moving the cursor.
    fn peek_slice(&self, skip: usize, len: usize) -> Result<&[u8]> {
        let core = self.core()?;
        let start = core.check(skip, len)?;
        Ok(&core.data[start..start + len])
    }

    fn peek<const N: usize>(&self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.peek_slice(0, N)?);
        Ok(out)
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        let core = self.core_mut()?;
        let start = core.check(0, len)?;
        core.move_to(start + len);
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.peek::<N>()?;
        self.skip(N)?;
        Ok(bytes)
    }

    /// Bytes `[0, high_water_mark)`: the populated range to hand to a transport.
    pub fn written(&self) -> &[u8] {
        match self.core.as_deref() {
            Some(core) => &core.data[..core.high_water_mark],
            None => &[],
        }
    }

    /// Owned copy of [`Blob::written`].
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.written())
    }

    /// Copy `src[start..start + len]` in at the cursor.
    pub fn copy_from_slice(&mut self, src: &[u8], start: usize, len: usize) -> Result<()> {
        let end = start.checked_add(len).filter(|&end| end <= src.len());
        let Some(end) = end else {
            return Err(Error::OutOfRange {
                position: start,
                len,
                capacity: src.len(),
            });
        };
        self.put_slice(&src[start..end])
    }

    /// Move `len` bytes from `other`'s cursor to this blob's cursor.
    ///
    /// Both cursors advance. Nothing moves unless both ranges fit.
    pub fn copy_from_blob(&mut self, other: &mut Blob, len: usize) -> Result<()> {
        self.core()?.check(0, len)?;
        let src = other.peek_slice(0, len)?;
        let core = self.core_mut()?;
        let start = core.cursor;
        core.data[start..start + len].copy_from_slice(src);
        core.move_to(start + len);
        other.skip(len)
    }

    /// Fill `dst` from the cursor.
    pub fn read_raw_into(&mut self, dst: &mut [u8]) -> Result<()> {
        dst.copy_from_slice(self.peek_slice(0, dst.len())?);
        self.skip(dst.len())
    }

    // === Primitives ===

    pub fn write_u8(&mut self, val: u8) -> Result<()> {
        self.put_slice(&[val])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    pub fn write_i16(&mut self, val: i16) -> Result<()> {
        self.put_slice(&val.to_le_bytes())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.take().map(i16::from_le_bytes)
    }

    pub fn write_u16(&mut self, val: u16) -> Result<()> {
        self.put_slice(&val.to_le_bytes())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.take().map(u16::from_le_bytes)
    }

    pub fn write_i32(&mut self, val: i32) -> Result<()> {
        self.put_slice(&val.to_le_bytes())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.take().map(i32::from_le_bytes)
    }

    pub fn write_u32(&mut self, val: u32) -> Result<()> {
        self.put_slice(&val.to_le_bytes())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.take().map(u32::from_le_bytes)
    }

    pub fn write_i64(&mut self, val: i64) -> Result<()> {
        self.put_slice(&val.to_le_bytes())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.take().map(i64::from_le_bytes)
    }

    pub fn write_u64(&mut self, val: u64) -> Result<()> {
        self.put_slice(&val.to_le_bytes())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.take().map(u64::from_le_bytes)
    }

    /// Write the IEEE-754 bit pattern of `val` as a `u32`.
    ///
    /// `to_bits`/`from_bits` is the only reinterpretation between the float
    /// and its wire form, so NaN payloads and infinities round-trip exactly.
    pub fn write_f32(&mut self, val: f32) -> Result<()> {
        self.write_u32(val.to_bits())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_u32().map(f32::from_bits)
    }

    pub fn write_bool(&mut self, val: bool) -> Result<()> {
        self.write_u8(if val { BOOL_TRUE } else { 0 })
    }

    /// Only [`BOOL_TRUE`] decodes as `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? == BOOL_TRUE)
    }

    // === Strings ===

    /// Write an i32 byte length followed by the UTF-8 bytes; `None` writes `-1`.
    pub fn write_string(&mut self, val: Option<&str>) -> Result<()> {
        let Some(s) = val else {
            return self.write_i32(NULL_STRING_LEN);
        };
        let bytes = s.as_bytes();
        let start = self.core()?.check(0, LEN_PREFIX + bytes.len())?;
        let len = i32::try_from(bytes.len()).map_err(|_| Error::OutOfRange {
            position: start,
            len: bytes.len(),
            capacity: self.capacity(),
        })?;
        self.write_i32(len)?;
        self.put_slice(bytes)
    }

    /// Read a length-prefixed string. Length `-1` yields `None` after 4 bytes.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let len = i32::from_le_bytes(self.peek::<4>()?);
        if len == NULL_STRING_LEN {
            self.skip(LEN_PREFIX)?;
            return Ok(None);
        }
        let len = usize::try_from(len).map_err(|_| Error::InvalidLength(len))?;
        let s = std::str::from_utf8(self.peek_slice(LEN_PREFIX, len)?)?.to_owned();
        self.skip(LEN_PREFIX + len)?;
        Ok(Some(s))
    }

    /// Write raw UTF-8 bytes with no length prefix.
    pub fn write_fixed_string(&mut self, val: &str) -> Result<()> {
        self.put_slice(val.as_bytes())
    }

    /// Read `len` bytes of UTF-8.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        let s = std::str::from_utf8(self.peek_slice(0, len)?)?.to_owned();
        self.skip(len)?;
        Ok(s)
    }
}

impl Drop for Blob {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.core.as_deref() {
            Some(core) => f
                .debug_struct("Blob")
                .field("id", &core.id)
                .field("offset", &core.offset)
                .field("capacity", &core.capacity())
                .field("cursor", &core.cursor)
                .field("high_water_mark", &core.high_water_mark)
                .field("prefix_origin", &core.prefix_origin)
                .finish(),
            None => f.write_str("Blob(released)"),
        }
    }
}
