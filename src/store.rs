use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ptr::NonNull;

use arrayvec::ArrayVec;

/// The append-only sequence of heap-allocated chunks backing a
/// [`StableVec`](crate::StableVec).
///
/// Each chunk is an [`ArrayVec`] behind its own `Box`, so the chunk's
/// storage is pinned to one heap allocation for its entire life. Growing
/// `chunks` relocates the boxes (the handles), never the chunks
/// themselves, which is what makes element addresses permanent.
///
/// Invariants:
///
/// * every chunk before index `len / N` is full;
/// * the chunk at `len / N` (if present) holds `len % N` elements;
/// * chunks after it exist only when created by [`reserve`](Self::reserve)
///   and are empty.
pub(crate) struct ChunkStore<T, const N: usize> {
    /// Total element count across all chunks. Elements are never removed,
    /// so a counter bumped on append always agrees with the sum of the
    /// chunk lengths.
    len: usize,
    chunks: Vec<Box<ArrayVec<T, N>>>,
}

impl<T, const N: usize> ChunkStore<T, N> {
    pub(crate) const fn new() -> Self {
        Self {
            len: 0,
            chunks: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.chunks.len() * N
    }

    /// Number of chunks currently holding at least one element.
    pub(crate) fn occupied_chunk_count(&self) -> usize {
        self.len.div_ceil(N)
    }

    /// Appends one element, allocating a fresh chunk first when the append
    /// target does not exist yet. This is the only growth trigger besides
    /// [`reserve`](Self::reserve).
    ///
    /// The target is located by count (`len / N`) rather than by taking
    /// the last chunk, so appends keep filling densely even when `reserve`
    /// has left empty chunks at the tail.
    pub(crate) fn push(&mut self, value: T) {
        let target = self.len / N;

        if target == self.chunks.len() {
            self.chunks.push(Box::new(ArrayVec::new()));
        }

        // The target chunk holds exactly `len % N` elements, so it always
        // has a free slot.
        self.chunks[target].push(value);
        self.len += 1;
    }

    /// Allocates whole empty chunks until `capacity() >= target_capacity`.
    /// Never deallocates; a no-op when capacity already suffices.
    pub(crate) fn reserve(&mut self, target_capacity: usize) {
        let chunks_needed = target_capacity.div_ceil(N);

        if let Some(missing) = chunks_needed.checked_sub(self.chunks.len()) {
            self.chunks.reserve(missing);

            for _ in 0..missing {
                self.chunks.push(Box::new(ArrayVec::new()));
            }
        }
    }

    /// Direct access to a chunk. The caller guarantees the index is in
    /// range; out-of-range indices panic via the `Vec` index.
    pub(crate) fn chunk_at(&self, chunk_index: usize) -> &ArrayVec<T, N> {
        &self.chunks[chunk_index]
    }

    /// Raw pointer to the chunk handle table, for the mutable iterators.
    /// They must resolve elements without re-borrowing the store, so that
    /// references they have already handed out stay valid.
    pub(crate) fn chunk_table(&mut self) -> NonNull<Box<ArrayVec<T, N>>> {
        // `as_mut_ptr` is dangling but never null for an empty table.
        unsafe { NonNull::new_unchecked(self.chunks.as_mut_ptr()) }
    }

    /// Resolves a logical index to its element without bounds checks.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    pub(crate) unsafe fn element_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        self.chunks
            .get_unchecked(index / N)
            .get_unchecked(index % N)
    }

    /// Mutable counterpart of [`element_unchecked`](Self::element_unchecked).
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    pub(crate) unsafe fn element_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        self.chunks
            .get_unchecked_mut(index / N)
            .get_unchecked_mut(index % N)
    }

    pub(crate) fn into_chunks(self) -> (usize, Vec<Box<ArrayVec<T, N>>>) {
        (self.len, self.chunks)
    }
}

impl<T: Clone, const N: usize> Clone for ChunkStore<T, N> {
    /// Deep-copies every chunk into a fresh, independently owned box,
    /// preserving reserved-but-empty chunks so capacity survives the copy.
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            chunks: self.chunks.iter().cloned().collect(),
        }
    }
}
