//! Allocation strategy for context dictionaries.

use std::fmt;

/// Provides and reclaims the zeroed byte buffers that back context
/// dictionaries. Injected into an [`Engine`](crate::Engine) so allocation can
/// be tracked or made to fail in tests without touching the codecs.
pub trait DictionaryAllocator: Send + Sync + fmt::Debug {
    /// Returns a zero-filled buffer of exactly `size` bytes, or `None` when
    /// the allocation cannot be satisfied.
    fn allocate(&self, size: usize) -> Option<Vec<u8>>;

    /// Takes back a buffer previously handed out by `allocate`.
    fn deallocate(&self, buffer: Vec<u8>);
}

/// Global-heap allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl DictionaryAllocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Option<Vec<u8>> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(size).ok()?;
        buffer.resize(size, 0);
        Some(buffer)
    }

    fn deallocate(&self, buffer: Vec<u8>) {
        drop(buffer);
    }
}
