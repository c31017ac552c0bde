use alloc::boxed::Box;
use alloc::vec;
use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;
use core::ops::Range;
use core::ptr::NonNull;

use arrayvec::ArrayVec;

use crate::util::impl_iter;
use crate::StableVec;

/// Returned by [`StableVec::iter`].
///
/// A (container, index range) pair. The element address is recomputed
/// from the logical index on every step instead of being cached, mirroring
/// how the container itself resolves indices.
pub struct Iter<'a, T, const CHUNK_SIZE: usize> {
    list: &'a StableVec<T, CHUNK_SIZE>,
    indices: Range<usize>,
}

impl<'a, T, const CHUNK_SIZE: usize> Iter<'a, T, CHUNK_SIZE> {
    pub(crate) fn new(list: &'a StableVec<T, CHUNK_SIZE>) -> Self {
        let indices = 0..list.len();
        Self { list, indices }
    }
}

impl_iter! {
    on = Iter;
    params = { 'a, T, const CHUNK_SIZE: usize };
    args = { 'a, T, CHUNK_SIZE };
    inner = indices;
    item = { &'a T };
    map = { |this: &mut Self, index: usize| unsafe {
        // In range: `indices` only yields values below the length the
        // container had when the iterator was created, and the container
        // cannot have shrunk since.
        Some(this.list.get_unchecked(index))
    }};
    clone = { |this: &Self| Self {
        list: this.list,
        indices: this.indices.clone(),
    }};
}

impl<T, const CHUNK_SIZE: usize> Debug for Iter<'_, T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Iter").field("indices", &self.indices).finish()
    }
}

/// Returned by [`StableVec::iter_mut`].
///
/// Resolves elements through a raw pointer to the chunk table captured
/// at construction. Yielding never re-borrows the container or a whole
/// chunk that earlier yields still point into, so the returned
/// references all remain usable together after iteration.
pub struct IterMut<'a, T, const CHUNK_SIZE: usize> {
    table: NonNull<Box<ArrayVec<T, CHUNK_SIZE>>>,
    indices: Range<usize>,
    /// Chunk base of the most recent front yield.
    front: Option<(usize, *mut T)>,
    /// Chunk base of the most recent back yield.
    back: Option<(usize, *mut T)>,
    _marker: PhantomData<&'a mut StableVec<T, CHUNK_SIZE>>,
}

impl<'a, T, const CHUNK_SIZE: usize> IterMut<'a, T, CHUNK_SIZE> {
    pub(crate) fn new(list: &'a mut StableVec<T, CHUNK_SIZE>) -> Self {
        let indices = 0..list.len();

        Self {
            table: list.store.chunk_table(),
            indices,
            front: None,
            back: None,
            _marker: PhantomData,
        }
    }

    /// Resolves `index` to its element through the captured table pointer.
    ///
    /// A chunk is borrowed whole at most once, when an end of the
    /// iterator first enters it; the base pointer is cached per end and
    /// every element is then derived from a base. The front's yields all
    /// sit below `indices.start` and the back's at or above `indices.end`,
    /// so the only chunks that can still hold live references when an end
    /// advances are the two cached ones.
    ///
    /// # Safety
    ///
    /// `index` must have been produced by `indices`, and each index at
    /// most once.
    unsafe fn element_ptr(&mut self, index: usize) -> *mut T {
        let chunk = index / CHUNK_SIZE;

        let base = match (self.front, self.back) {
            (Some((cached, base)), _) | (_, Some((cached, base))) if cached == chunk => base,
            _ => (**self.table.as_ptr().add(chunk)).as_mut_ptr(),
        };

        // `indices` has already advanced past `index`, so the side the
        // yield came from can be read off the comparison.
        if index < self.indices.start {
            self.front = Some((chunk, base));
        } else {
            self.back = Some((chunk, base));
        }

        base.add(index % CHUNK_SIZE)
    }
}

impl_iter! {
    on = IterMut;
    params = { 'a, T, const CHUNK_SIZE: usize };
    args = { 'a, T, CHUNK_SIZE };
    inner = indices;
    item = { &'a mut T };
    map = { |this: &mut Self, index: usize| unsafe {
        // Each index is yielded at most once, so the returned mutable
        // borrows never alias each other.
        Some(&mut *this.element_ptr(index))
    }};
    clone = false;
}

unsafe impl<T: Send, const CHUNK_SIZE: usize> Send for IterMut<'_, T, CHUNK_SIZE> {}

unsafe impl<T: Sync, const CHUNK_SIZE: usize> Sync for IterMut<'_, T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> Debug for IterMut<'_, T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("IterMut").field("indices", &self.indices).finish()
    }
}

/// Returned by [`StableVec::chunks`].
///
/// Yields the occupied prefix of every element-bearing chunk, in order.
pub struct ChunksIter<'a, T, const CHUNK_SIZE: usize> {
    list: &'a StableVec<T, CHUNK_SIZE>,
    indices: Range<usize>,
}

impl<'a, T, const CHUNK_SIZE: usize> ChunksIter<'a, T, CHUNK_SIZE> {
    pub(crate) fn new(list: &'a StableVec<T, CHUNK_SIZE>) -> Self {
        let indices = 0..list.store.occupied_chunk_count();
        Self { list, indices }
    }
}

impl_iter! {
    on = ChunksIter;
    params = { 'a, T, const CHUNK_SIZE: usize };
    args = { 'a, T, CHUNK_SIZE };
    inner = indices;
    item = { &'a [T] };
    map = { |this: &mut Self, chunk_index: usize| {
        Some(this.list.store.chunk_at(chunk_index).as_slice())
    }};
    clone = { |this: &Self| Self {
        list: this.list,
        indices: this.indices.clone(),
    }};
}

impl<T, const CHUNK_SIZE: usize> Debug for ChunksIter<'_, T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("ChunksIter").field("indices", &self.indices).finish()
    }
}

/// Returned by [`StableVec::chunks_mut`].
pub struct ChunksIterMut<'a, T, const CHUNK_SIZE: usize> {
    table: NonNull<Box<ArrayVec<T, CHUNK_SIZE>>>,
    indices: Range<usize>,
    _marker: PhantomData<&'a mut StableVec<T, CHUNK_SIZE>>,
}

impl<'a, T, const CHUNK_SIZE: usize> ChunksIterMut<'a, T, CHUNK_SIZE> {
    pub(crate) fn new(list: &'a mut StableVec<T, CHUNK_SIZE>) -> Self {
        let indices = 0..list.store.occupied_chunk_count();

        Self {
            table: list.store.chunk_table(),
            indices,
            _marker: PhantomData,
        }
    }
}

impl_iter! {
    on = ChunksIterMut;
    params = { 'a, T, const CHUNK_SIZE: usize };
    args = { 'a, T, CHUNK_SIZE };
    inner = indices;
    item = { &'a mut [T] };
    map = { |this: &mut Self, chunk_index: usize| unsafe {
        // Chunks are disjoint and each chunk index is yielded once, so
        // this whole-chunk borrow never overlaps an earlier slice.
        Some((**this.table.as_ptr().add(chunk_index)).as_mut_slice())
    }};
    clone = false;
}

unsafe impl<T: Send, const CHUNK_SIZE: usize> Send for ChunksIterMut<'_, T, CHUNK_SIZE> {}

unsafe impl<T: Sync, const CHUNK_SIZE: usize> Sync for ChunksIterMut<'_, T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> Debug for ChunksIterMut<'_, T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("ChunksIterMut").field("indices", &self.indices).finish()
    }
}

/// Returned by [`StableVec::into_iter`].
///
/// Drains the container chunk by chunk; dropping the iterator drops any
/// elements that were not yielded.
pub struct IntoIter<T, const CHUNK_SIZE: usize> {
    remaining: usize,
    front: arrayvec::IntoIter<T, CHUNK_SIZE>,
    back: arrayvec::IntoIter<T, CHUNK_SIZE>,
    chunks: vec::IntoIter<Box<ArrayVec<T, CHUNK_SIZE>>>,
}

impl<T, const CHUNK_SIZE: usize> IntoIter<T, CHUNK_SIZE> {
    pub(crate) fn new(list: StableVec<T, CHUNK_SIZE>) -> Self {
        let (len, chunks) = list.store.into_chunks();

        Self {
            remaining: len,
            front: ArrayVec::new().into_iter(),
            back: ArrayVec::new().into_iter(),
            chunks: chunks.into_iter(),
        }
    }
}

impl<T, const CHUNK_SIZE: usize> Iterator for IntoIter<T, CHUNK_SIZE> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(value) = self.front.next() {
                self.remaining -= 1;
                return Some(value);
            }

            match self.chunks.next() {
                Some(chunk) => self.front = (*chunk).into_iter(),
                None => {
                    let value = self.back.next()?;
                    self.remaining -= 1;
                    return Some(value);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const CHUNK_SIZE: usize> DoubleEndedIterator for IntoIter<T, CHUNK_SIZE> {
    fn next_back(&mut self) -> Option<T> {
        loop {
            if let Some(value) = self.back.next_back() {
                self.remaining -= 1;
                return Some(value);
            }

            match self.chunks.next_back() {
                Some(chunk) => self.back = (*chunk).into_iter(),
                None => {
                    let value = self.front.next_back()?;
                    self.remaining -= 1;
                    return Some(value);
                }
            }
        }
    }
}

impl<T, const CHUNK_SIZE: usize> ExactSizeIterator for IntoIter<T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> core::iter::FusedIterator for IntoIter<T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> Debug for IntoIter<T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.remaining).finish()
    }
}
