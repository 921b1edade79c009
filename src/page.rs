//! Page memory accessor — the consumed interface from the (out-of-scope)
//! page cache layer (§6).
//!
//! The node layer only needs byte-level read/write plus span copies; it has
//! no opinion on how the page was obtained (mmap, heap buffer, pooled slab).
//! `InMemoryPage` is a `Vec<u8>`-backed implementation used by the proxy
//! tests and by callers that do not yet have a real page cache wired up.

use crate::error::{NodeError, Result};

/// Capability to read and write bytes at an offset within a fixed-size page.
///
/// No concurrency contract is implied beyond §5: a page is mutated
/// exclusively by the thread holding its write lease, while multiple
/// read-only accessors may observe it concurrently.
pub trait PageAccessor {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_u8(&self, offset: usize) -> Result<u8>;
    fn write_u8(&mut self, offset: usize, value: u8) -> Result<()>;

    fn read_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;
    fn write_slice(&mut self, offset: usize, bytes: &[u8]) -> Result<()>;

    /// The whole page as a byte slice. Record decoding (`record.rs`) always
    /// walks an offset table against a flat buffer, so every accessor —
    /// page-backed or an owned snapshot — exposes itself this way rather
    /// than through one-field-at-a-time reads.
    fn as_bytes(&self) -> &[u8];

    fn read_u32(&self, offset: usize) -> Result<u32> {
        let bytes: [u8; 4] = self.read_slice(offset, 4)?.try_into().unwrap();
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_i32(&self, offset: usize) -> Result<i32> {
        Ok(self.read_u32(offset)? as i32)
    }

    fn read_i64(&self, offset: usize) -> Result<i64> {
        let bytes: [u8; 8] = self.read_slice(offset, 8)?.try_into().unwrap();
        Ok(i64::from_le_bytes(bytes))
    }

    fn write_i64(&mut self, offset: usize, value: i64) -> Result<()> {
        self.write_slice(offset, &value.to_le_bytes())
    }
}

/// Simple heap-backed page used for tests and for callers without a real
/// mmap-based page cache.
#[derive(Debug, Clone)]
pub struct InMemoryPage {
    bytes: Vec<u8>,
}

impl InMemoryPage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn zeroed(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len],
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl PageAccessor for InMemoryPage {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read_u8(&self, offset: usize) -> Result<u8> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(NodeError::TruncatedRecord {
                offset,
                expected: 1,
            })
    }

    fn write_u8(&mut self, offset: usize, value: u8) -> Result<()> {
        let slot = self
            .bytes
            .get_mut(offset)
            .ok_or(NodeError::TruncatedRecord {
                offset,
                expected: 1,
            })?;
        *slot = value;
        Ok(())
    }

    fn read_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.bytes
            .get(offset..offset + len)
            .ok_or(NodeError::TruncatedRecord {
                offset,
                expected: len,
            })
    }

    fn write_slice(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let dst = self
            .bytes
            .get_mut(offset..offset + bytes.len())
            .ok_or(NodeError::TruncatedRecord {
                offset,
                expected: bytes.len(),
            })?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
