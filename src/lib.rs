#![doc = include_str!("doc.md")]
#![cfg_attr(not(any(test, doc)), no_std)]
#![warn(missing_debug_implementations, missing_docs)]

extern crate alloc;

use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::hash::{Hash, Hasher};
use core::mem;
use core::ops::{Index, IndexMut};

use thiserror::Error;

pub use iter::{ChunksIter, ChunksIterMut, IntoIter, Iter, IterMut};

use crate::store::ChunkStore;

mod iter;
mod store;
mod util;

/// Error returned by the checked accessors [`StableVec::at`] and
/// [`StableVec::at_mut`] when the requested logical index is not less
/// than the current length.
///
/// This is the only recoverable failure the container reports; every
/// other misuse is either a panic (the `Index` operator) or an `unsafe`
/// contract (the `*_unchecked` accessors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index out of range (index={index}, len={len})")]
pub struct OutOfRangeError {
    /// The requested logical index.
    pub index: usize,
    /// The container length at the time of the call.
    pub len: usize,
}

#[doc = include_str!("doc.md")]
pub struct StableVec<T, const CHUNK_SIZE: usize = 1024> {
    pub(crate) store: ChunkStore<T, CHUNK_SIZE>,
}

impl<T, const CHUNK_SIZE: usize> StableVec<T, CHUNK_SIZE> {
    /// Creates a new, empty `StableVec`. Does not allocate.
    ///
    /// # Panics
    ///
    /// If `CHUNK_SIZE` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let list: StableVec<u32> = StableVec::new();
    /// assert!(list.is_empty());
    /// assert_eq!(list.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        assert!(CHUNK_SIZE > 0, "chunk size must be at least 1");

        Self {
            store: ChunkStore::new(),
        }
    }

    /// Creates an empty `StableVec` with room for at least `capacity`
    /// elements before any further allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let list: StableVec<u32, 10> = StableVec::with_capacity(25);
    /// assert_eq!(list.capacity(), 30);
    /// assert!(list.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut list = Self::new();
        list.reserve(capacity);
        list
    }

    /// Creates a `StableVec` holding `count` copies of `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let list: StableVec<u32, 10> = StableVec::from_elem(5, 1);
    /// assert_eq!(list.len(), 5);
    /// assert_eq!(list.iter().sum::<u32>(), 5);
    /// ```
    pub fn from_elem(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        let mut list = Self::with_capacity(count);
        list.extend(core::iter::repeat(value).take(count));
        list
    }

    /// Creates a `StableVec` holding `count` default-constructed elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let list: StableVec<u32, 10> = StableVec::from_default(5);
    /// assert_eq!(list.len(), 5);
    /// assert_eq!(list[4], 0);
    /// ```
    pub fn from_default(count: usize) -> Self
    where
        T: Default,
    {
        let mut list = Self::with_capacity(count);
        list.extend(core::iter::repeat_with(T::default).take(count));
        list
    }

    /// The chunk capacity this container type was instantiated with.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// assert_eq!(StableVec::<u32, 10>::chunk_size(), 10);
    /// ```
    pub const fn chunk_size() -> usize {
        CHUNK_SIZE
    }

    /// Returns the number of elements in the container.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    /// assert_eq!(list.len(), 0);
    ///
    /// list.push(1);
    /// assert_eq!(list.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the container holds no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    /// assert!(list.is_empty());
    ///
    /// list.push(1);
    /// assert!(!list.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total element capacity of the allocated chunks.
    ///
    /// Always a multiple of `CHUNK_SIZE`, and never less than
    /// [`len`](Self::len).
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    /// assert_eq!(list.capacity(), 0);
    ///
    /// list.push(1);
    /// assert_eq!(list.capacity(), 10);
    /// ```
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Allocates chunks until the capacity is at least `target_capacity`.
    ///
    /// Afterwards, growing the container up to `target_capacity` total
    /// elements performs no further allocation. Capacity never shrinks;
    /// reserving less than the current capacity does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    ///
    /// list.reserve(31);
    /// assert_eq!(list.capacity(), 40);
    ///
    /// list.reserve(10);
    /// assert_eq!(list.capacity(), 40);
    /// ```
    pub fn reserve(&mut self, target_capacity: usize) {
        self.store.reserve(target_capacity);
    }

    /// Appends an element to the end of the container.
    ///
    /// Amortized O(1): at most one chunk allocation happens per
    /// `CHUNK_SIZE` appends. Appending never moves existing elements, so
    /// references and pointers obtained earlier remain valid.
    ///
    /// There is no separate in-place construction entry point; moving the
    /// value into the chunk slot is the Rust equivalent of both
    /// `push_back` and `emplace_back`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 2> = StableVec::new();
    /// list.push(1);
    /// list.push(2);
    ///
    /// let first = &list[0] as *const u32;
    /// for i in 3..100 {
    ///     list.push(i);
    /// }
    ///
    /// assert!(core::ptr::eq(first, &list[0]));
    /// ```
    pub fn push(&mut self, value: T) {
        self.store.push(value);
    }

    /// Returns a reference to the element at `index`, or `None` if the
    /// index is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    /// assert_eq!(list.get(0), None);
    ///
    /// list.push(1);
    /// assert_eq!(list.get(0), Some(&1));
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len() {
            Some(unsafe { self.get_unchecked(index) })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the element at `index`, or `None`
    /// if the index is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    /// assert_eq!(list.get_mut(0), None);
    ///
    /// list.push(1);
    /// assert_eq!(list.get_mut(0), Some(&mut 1));
    /// ```
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len() {
            Some(unsafe { self.get_unchecked_mut(index) })
        } else {
            None
        }
    }

    /// Returns a reference to the element at `index` without bounds
    /// checking.
    ///
    /// The index resolves to chunk `index / CHUNK_SIZE` at offset
    /// `index % CHUNK_SIZE`.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len); otherwise the
    /// behavior is undefined.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        self.store.element_unchecked(index)
    }

    /// Returns a mutable reference to the element at `index` without
    /// bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len); otherwise the
    /// behavior is undefined.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        self.store.element_unchecked_mut(index)
    }

    /// Returns a reference to the element at `index`, or an
    /// [`OutOfRangeError`] if the index is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::{OutOfRangeError, StableVec};
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    /// assert_eq!(list.at(0), Err(OutOfRangeError { index: 0, len: 0 }));
    ///
    /// list.push(1);
    /// assert_eq!(list.at(0), Ok(&1));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, OutOfRangeError> {
        let len = self.len();
        self.get(index).ok_or(OutOfRangeError { index, len })
    }

    /// Returns a mutable reference to the element at `index`, or an
    /// [`OutOfRangeError`] if the index is out of bounds.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRangeError> {
        let len = self.len();
        self.get_mut(index).ok_or(OutOfRangeError { index, len })
    }

    /// Returns a reference to the first element, or `None` if the
    /// container is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    /// assert_eq!(list.first(), None);
    ///
    /// list.push(1);
    /// list.push(2);
    /// assert_eq!(list.first(), Some(&1));
    /// ```
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a mutable reference to the first element, or `None` if the
    /// container is empty.
    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns a reference to the last element, or `None` if the
    /// container is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut list: StableVec<u32, 10> = StableVec::new();
    /// assert_eq!(list.last(), None);
    ///
    /// list.push(1);
    /// list.push(2);
    /// assert_eq!(list.last(), Some(&2));
    /// ```
    pub fn last(&self) -> Option<&T> {
        let index = self.len().checked_sub(1)?;
        self.get(index)
    }

    /// Returns a mutable reference to the last element, or `None` if the
    /// container is empty.
    pub fn last_mut(&mut self) -> Option<&mut T> {
        let index = self.len().checked_sub(1)?;
        self.get_mut(index)
    }

    /// Exchanges the contents of two containers in O(1).
    ///
    /// Only the chunk ownership moves; no element is copied. References
    /// and iterators obtained before the swap keep pointing at the same
    /// memory, which now belongs to the other container.
    ///
    /// Equivalent to `core::mem::swap` on the two values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let mut a: StableVec<u32, 10> = StableVec::from([1, 2]);
    /// let mut b: StableVec<u32, 10> = StableVec::from([3]);
    ///
    /// a.swap(&mut b);
    ///
    /// assert_eq!(a, StableVec::from([3]));
    /// assert_eq!(b, StableVec::from([1, 2]));
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.store, &mut other.store);
    }

    /// Returns an iterator over references to each element.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let list: StableVec<u32, 2> = StableVec::from([1, 2, 3]);
    /// let mut iter = list.iter();
    ///
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<T, CHUNK_SIZE> {
        Iter::new(self)
    }

    /// Like [`iter`](Self::iter), but returning mutable references.
    pub fn iter_mut(&mut self) -> IterMut<T, CHUNK_SIZE> {
        IterMut::new(self)
    }

    /// Returns an iterator over the occupied part of each chunk, in
    /// order.
    ///
    /// Every element appears in exactly one chunk; all chunks except
    /// possibly the last are full.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stable_vector::StableVec;
    /// let list: StableVec<u32, 4> = StableVec::from_iter(0..10);
    ///
    /// let expected: [&[u32]; 3] = [&[0, 1, 2, 3], &[4, 5, 6, 7], &[8, 9]];
    /// assert!(Iterator::eq(list.chunks(), expected));
    /// ```
    pub fn chunks(&self) -> ChunksIter<T, CHUNK_SIZE> {
        ChunksIter::new(self)
    }

    /// Like [`chunks`](Self::chunks), but returning mutable slices.
    pub fn chunks_mut(&mut self) -> ChunksIterMut<T, CHUNK_SIZE> {
        ChunksIterMut::new(self)
    }
}

/// Creates a [`StableVec`] containing the given elements, in the style of
/// `vec!`.
///
/// # Examples
///
/// ```
/// # use stable_vector::{stable_vec, StableVec};
/// let list: StableVec<u32, 10> = stable_vec![1, 2, 3];
/// assert_eq!(list.len(), 3);
///
/// let fives: StableVec<u32, 10> = stable_vec![5; 4];
/// assert_eq!(fives.iter().sum::<u32>(), 20);
/// ```
#[macro_export]
macro_rules! stable_vec {
    () => {
        $crate::StableVec::new()
    };
    ($elem:expr; $count:expr) => {
        $crate::StableVec::from_elem($count, $elem)
    };
    ($($value:expr),+ $(,)?) => {
        $crate::StableVec::from_iter([$($value),+])
    };
}

impl<T, const CHUNK_SIZE: usize> Default for StableVec<T, CHUNK_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CHUNK_SIZE: usize> Extend<T> for StableVec<T, CHUNK_SIZE> {
    /// Appends zero or more elements, one `push` at a time.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, const CHUNK_SIZE: usize> FromIterator<T> for StableVec<T, CHUNK_SIZE> {
    /// Collects the iterator in a single forward pass; the input does not
    /// need to report its length up front.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T, const CHUNK_SIZE: usize, const M: usize> From<[T; M]> for StableVec<T, CHUNK_SIZE> {
    fn from(values: [T; M]) -> Self {
        Self::from_iter(values)
    }
}

impl<T, const CHUNK_SIZE: usize> IntoIterator for StableVec<T, CHUNK_SIZE> {
    type Item = T;
    type IntoIter = IntoIter<T, CHUNK_SIZE>;

    /// Converts the container into an iterator over its elements by
    /// value. Dropping the iterator drops the remaining elements.
    fn into_iter(self) -> IntoIter<T, CHUNK_SIZE> {
        IntoIter::new(self)
    }
}

impl<'a, T, const CHUNK_SIZE: usize> IntoIterator for &'a StableVec<T, CHUNK_SIZE> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, CHUNK_SIZE>;

    fn into_iter(self) -> Iter<'a, T, CHUNK_SIZE> {
        self.iter()
    }
}

impl<'a, T, const CHUNK_SIZE: usize> IntoIterator for &'a mut StableVec<T, CHUNK_SIZE> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, CHUNK_SIZE>;

    fn into_iter(self) -> IterMut<'a, T, CHUNK_SIZE> {
        self.iter_mut()
    }
}

impl<T, const CHUNK_SIZE: usize> Index<usize> for StableVec<T, CHUNK_SIZE> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(result) => result,
            None => {
                panic!("index out of bounds (index={}, len={})", index, self.len());
            }
        }
    }
}

impl<T, const CHUNK_SIZE: usize> IndexMut<usize> for StableVec<T, CHUNK_SIZE> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();

        match self.get_mut(index) {
            Some(result) => result,
            None => {
                panic!("index out of bounds (index={}, len={})", index, len);
            }
        }
    }
}

impl<T: Debug, const CHUNK_SIZE: usize> Debug for StableVec<T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T: Clone, const CHUNK_SIZE: usize> Clone for StableVec<T, CHUNK_SIZE> {
    /// Deep copy: every chunk is duplicated into fresh storage, so the
    /// clone and the original can grow independently.
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: PartialEq, const CHUNK_SIZE: usize> PartialEq for StableVec<T, CHUNK_SIZE> {
    /// Structural equality: lengths match and corresponding elements
    /// compare equal, in index order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && Iterator::eq(self.iter(), other.iter())
    }
}

impl<T: Eq, const CHUNK_SIZE: usize> Eq for StableVec<T, CHUNK_SIZE> {}

impl<T: Hash, const CHUNK_SIZE: usize> Hash for StableVec<T, CHUNK_SIZE> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());

        for value in self.iter() {
            Hash::hash(value, state);
        }
    }
}

impl<T: PartialOrd, const CHUNK_SIZE: usize> PartialOrd for StableVec<T, CHUNK_SIZE> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Iterator::partial_cmp(self.iter(), other.iter())
    }
}

impl<T: Ord, const CHUNK_SIZE: usize> Ord for StableVec<T, CHUNK_SIZE> {
    fn cmp(&self, other: &Self) -> Ordering {
        Iterator::cmp(self.iter(), other.iter())
    }
}
