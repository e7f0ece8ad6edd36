// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! A stack-discipline scratch sub-allocator.
//!
//! Mirrors the original `allocator.h`'s `Alloc`/`AllocAligned`/`Free` triad, but owns its backing
//! storage directly as a `Vec<u8>` rather than delegating through a caller-supplied vtable — the
//! C-ABI SDK surface that vtable served is out of scope. There is no individual
//! free: a [`Scope`] bumps a cursor forward and is discarded wholesale when dropped, restoring the
//! cursor to where it started.

use crate::errors::{CineformError, Result};

/// SIMD lane alignment every plane and scratch allocation must satisfy.
pub const ALIGNMENT: usize = 16;

fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Rounds `value` up to the next multiple of `align` (a power of two). Exposed for callers such
/// as [`crate::plane::PixelPlane`] that need to compute a pitch before allocating.
pub fn align_up_pub(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    align_up(value, align)
}

/// Owns a single contiguous backing buffer and hands out stack-discipline [`Scope`]s over it.
pub struct Arena {
    buf: Vec<u8>,
    cursor: usize,
}

impl Arena {
    /// Allocates a new arena with `capacity` bytes of backing storage.
    pub fn new(capacity: usize) -> Self {
        Arena { buf: vec![0u8; capacity], cursor: 0 }
    }

    /// Total backing capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes currently in use by live scopes.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Opens the root scope. Only one scope may be live against an `Arena` at a time; nested
    /// scopes are opened via [`Scope::push`].
    pub fn root(&mut self) -> Scope<'_> {
        let start = self.cursor;
        Scope { arena: self, start }
    }
}

/// A nested allocation scope snapshotting the arena's cursor on entry and restoring it on drop.
///
/// `push(parent) -> child`: `child` is a `Scope` borrowed from `parent`, and any bytes bumped
/// within it are released the moment it goes out of scope.
pub struct Scope<'a> {
    arena: &'a mut Arena,
    start: usize,
}

impl<'a> Scope<'a> {
    /// Opens a child scope nested within this one.
    pub fn push(&mut self) -> Scope<'_> {
        let start = self.arena.cursor;
        Scope { arena: self.arena, start }
    }

    /// Bumps the cursor by `size` bytes and returns a zeroed slice of that length.
    pub fn alloc(&mut self, size: usize) -> Result<&mut [u8]> {
        self.alloc_aligned(size, 1)
    }

    /// As [`Scope::alloc`], but first bumps the cursor up to `align` (which must be a power of
    /// two). `cineform-wavelet` and `cineform-color` always request [`ALIGNMENT`]-aligned slabs
    /// for plane and band buffers.
    pub fn alloc_aligned(&mut self, size: usize, align: usize) -> Result<&mut [u8]> {
        debug_assert!(align.is_power_of_two());

        let aligned_start = align_up(self.arena.cursor, align);
        let end = aligned_start
            .checked_add(size)
            .ok_or(CineformError::ScratchExhausted)?;

        if end > self.arena.buf.len() {
            return Err(CineformError::ScratchExhausted);
        }

        self.arena.buf[aligned_start..end].fill(0);
        self.arena.cursor = end;

        Ok(&mut self.arena.buf[aligned_start..end])
    }

    /// Bytes available to this scope before the next allocation would fail.
    pub fn remaining(&self) -> usize {
        self.arena.buf.len() - self.arena.cursor
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.arena.cursor = self.start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_bumps_and_restores_on_drop() {
        let mut arena = Arena::new(64);
        {
            let mut scope = arena.root();
            let slab = scope.alloc(16).unwrap();
            assert_eq!(slab.len(), 16);
            assert_eq!(scope.arena.cursor, 16);
        }
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn nested_scope_restores_independently() {
        let mut arena = Arena::new(64);
        let mut root = arena.root();
        root.alloc(8).unwrap();
        {
            let mut child = root.push();
            child.alloc(32).unwrap();
            assert_eq!(child.arena.cursor, 40);
        }
        assert_eq!(root.arena.cursor, 8);
    }

    #[test]
    fn alloc_aligned_rounds_up_start() {
        let mut arena = Arena::new(64);
        let mut scope = arena.root();
        scope.alloc(1).unwrap();
        let slab = scope.alloc_aligned(16, ALIGNMENT).unwrap();
        assert_eq!(slab.len(), 16);
        assert_eq!(scope.arena.cursor, 32);
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut arena = Arena::new(8);
        let mut scope = arena.root();
        assert!(matches!(scope.alloc(9), Err(CineformError::ScratchExhausted)));
    }
}
