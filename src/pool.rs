// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! A contiguous growable arena addressed by stable handles.
//!
//! Pool is a contiguous block of entries, each addressed by a [`Handle`].
//! When you put an object into the pool you get a handle to that object and
//! can use it later on to borrow a reference. A handle can also be "none",
//! which plays the role a null pointer would, but can be checked before use.
//!
//! Scenes built by this crate are assembled once and dropped as a whole, so
//! entries are never freed individually and handles stay valid for the
//! lifetime of the pool.

use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

const INVALID_INDEX: u32 = u32::MAX;

/// A typed index into a [`Pool`].
pub struct Handle<T> {
    index: u32,
    marker: PhantomData<T>,
}

impl<T> Handle<T> {
    /// Handle that points to nothing.
    pub const NONE: Handle<T> = Handle {
        index: INVALID_INDEX,
        marker: PhantomData,
    };

    pub fn is_none(self) -> bool {
        self.index == INVALID_INDEX
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "Handle::NONE")
        } else {
            write!(f, "Handle({})", self.index)
        }
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::NONE
    }
}

/// Append-only arena of `T` addressed by [`Handle<T>`].
pub struct Pool<T> {
    records: Vec<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Puts an object into the pool and returns a handle to it.
    pub fn spawn(&mut self, value: T) -> Handle<T> {
        let handle = Handle {
            index: u32::try_from(self.records.len()).expect("pool capacity exceeded"),
            marker: PhantomData,
        };
        self.records.push(value);
        handle
    }

    /// Borrows a reference to an object. Panics on invalid handles, which
    /// indicate a bug in the caller rather than malformed input.
    pub fn borrow(&self, handle: Handle<T>) -> &T {
        &self.records[handle.index()]
    }

    pub fn borrow_mut(&mut self, handle: Handle<T>) -> &mut T {
        &mut self.records[handle.index()]
    }

    pub fn try_borrow(&self, handle: Handle<T>) -> Option<&T> {
        if handle.is_none() {
            None
        } else {
            self.records.get(handle.index())
        }
    }

    /// Borrows two distinct objects mutably at once.
    pub fn borrow_two_mut(&mut self, handles: (Handle<T>, Handle<T>)) -> (&mut T, &mut T) {
        let (a, b) = (handles.0.index(), handles.1.index());
        assert_ne!(a, b);
        if a < b {
            let (left, right) = self.records.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.records.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }

    pub fn alive_count(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    /// Iterates over (handle, object) pairs in spawn order.
    pub fn pair_iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.records.iter().enumerate().map(|(i, v)| {
            (
                Handle {
                    index: i as u32,
                    marker: PhantomData,
                },
                v,
            )
        })
    }

    pub fn handle_at(&self, index: usize) -> Handle<T> {
        assert!(index < self.records.len());
        Handle {
            index: index as u32,
            marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn spawn_and_borrow() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.spawn(10);
        let b = pool.spawn(20);
        assert_ne!(a, b);
        assert_eq!(*pool.borrow(a), 10);
        assert_eq!(*pool.borrow(b), 20);
        assert_eq!(pool.alive_count(), 2);
    }

    #[test]
    fn none_handle() {
        let pool: Pool<u32> = Pool::new();
        assert!(Handle::<u32>::NONE.is_none());
        assert!(pool.try_borrow(Handle::NONE).is_none());
    }

    #[test]
    fn borrow_two_mut() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.spawn(1);
        let b = pool.spawn(2);
        {
            let (ra, rb) = pool.borrow_two_mut((a, b));
            std::mem::swap(ra, rb);
        }
        assert_eq!(*pool.borrow(a), 2);
        assert_eq!(*pool.borrow(b), 1);
    }

    #[test]
    fn pair_iter_order() {
        let mut pool: Pool<&str> = Pool::new();
        let a = pool.spawn("a");
        let b = pool.spawn("b");
        let pairs: Vec<_> = pool.pair_iter().collect();
        assert_eq!(pairs[0].0, a);
        assert_eq!(pairs[1].0, b);
    }
}
