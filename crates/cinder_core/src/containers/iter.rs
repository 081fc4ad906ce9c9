//! # Hash Table Iteration
//!
//! Every traversal walks buckets in index order and, inside a bucket, the
//! head cell before the chain:
//!
//! ```text
//!   bucket 0: Empty              (skipped)
//!   bucket 1: A, [B, C]    ──>   A, B, C
//!   bucket 2: D, []        ──>   D
//!   bucket 3: Empty              (skipped)   ──> End
//! ```
//!
//! [`Cursor`] is the explicit position type. Its `advance` is a pure function
//! of the cursor and the bucket slice, so a cursor can be stored, compared
//! against `end()` and dereferenced later through the table.
//!
//! A cursor names its entry by [`EntryId`], not by chain index. Removing
//! other entries, including the head it was promoted past, leaves it on the
//! same entry. Removing its own entry makes it undereferenceable, though it
//! can still be advanced to the entry that followed.
//!
//! The borrowing iterators hold the table borrowed, so the table cannot be
//! mutated while one is alive.

use std::collections::vec_deque;
use std::collections::VecDeque;
use std::iter::FusedIterator;

use super::bucket::{HashBucket, Node};

/// Identity of one stored entry.
///
/// Handed out in increasing order as entries are inserted and never reused
/// within a table. Only a table creates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The id handed out after this one.
    #[inline]
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A position inside a hash table.
///
/// The variant records where the entry sat when the cursor was produced.
/// Dereferencing looks the entry up by id, so a chain entry promoted into
/// the head cell is still found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// On the head cell of a bucket.
    OnHead {
        /// Bucket index.
        bucket: usize,
        /// The entry under the cursor.
        entry: EntryId,
    },
    /// On a chain node of a bucket.
    OnChain {
        /// Bucket index.
        bucket: usize,
        /// The entry under the cursor.
        entry: EntryId,
    },
    /// One past the last entry. Never dereferenceable.
    End,
}

impl Cursor {
    /// The first entry of `buckets`, or [`Cursor::End`] when there is none.
    pub(crate) fn first<K, T>(buckets: &[HashBucket<K, T>]) -> Self {
        Self::first_occupied_from(buckets, 0)
    }

    fn first_occupied_from<K, T>(buckets: &[HashBucket<K, T>], from: usize) -> Self {
        buckets
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(bucket, slot)| slot.head_id().map(|entry| Self::OnHead { bucket, entry }))
            .unwrap_or(Self::End)
    }

    /// The position after `self`.
    ///
    /// Moves to the next entry of the same bucket, then to the head of the
    /// next occupied bucket. Works whether or not the cursor's own entry is
    /// still stored. A bucket index outside the table yields [`Cursor::End`].
    #[must_use]
    pub(crate) fn advance<K, T>(self, buckets: &[HashBucket<K, T>]) -> Self {
        let (bucket, entry) = match self {
            Self::End => return Self::End,
            Self::OnHead { bucket, entry } | Self::OnChain { bucket, entry } => (bucket, entry),
        };
        let Some(current) = buckets.get(bucket) else {
            return Self::End;
        };

        match current.successor(entry) {
            Some((entry, true)) => Self::OnHead { bucket, entry },
            Some((entry, false)) => Self::OnChain { bucket, entry },
            None => match bucket.checked_add(1) {
                Some(from) => Self::first_occupied_from(buckets, from),
                None => Self::End,
            },
        }
    }

    /// The bucket this cursor points into, `None` for [`Cursor::End`].
    #[inline]
    #[must_use]
    pub const fn bucket(self) -> Option<usize> {
        match self {
            Self::OnHead { bucket, .. } | Self::OnChain { bucket, .. } => Some(bucket),
            Self::End => None,
        }
    }

    /// The entry this cursor names, `None` for [`Cursor::End`].
    #[inline]
    #[must_use]
    pub const fn entry(self) -> Option<EntryId> {
        match self {
            Self::OnHead { entry, .. } | Self::OnChain { entry, .. } => Some(entry),
            Self::End => None,
        }
    }

    /// Returns `true` for the end sentinel.
    #[inline]
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::End)
    }

    /// The node under the cursor, if it is still stored.
    pub(crate) fn resolve<K, T>(self, buckets: &[HashBucket<K, T>]) -> Option<&Node<K, T>> {
        let (bucket, entry) = self.bucket().zip(self.entry())?;
        buckets.get(bucket)?.entry(entry)
    }

    /// Mutable form of [`Cursor::resolve`].
    pub(crate) fn resolve_mut<K, T>(
        self,
        buckets: &mut [HashBucket<K, T>],
    ) -> Option<&mut Node<K, T>> {
        let (bucket, entry) = self.bucket().zip(self.entry())?;
        buckets.get_mut(bucket)?.entry_mut(entry)
    }
}

/// Shared iterator over `(key, value)` pairs.
///
/// Created by [`HashTable::iter`](super::HashTable::iter).
pub struct Iter<'a, K, T> {
    buckets: &'a [HashBucket<K, T>],
    bucket: usize,
    position: usize,
}

impl<'a, K, T> Iter<'a, K, T> {
    pub(crate) fn new(buckets: &'a [HashBucket<K, T>]) -> Self {
        Self {
            buckets,
            bucket: 0,
            position: 0,
        }
    }

    /// Position of the next entry this iterator will yield.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        let Some(current) = self.buckets.get(self.bucket) else {
            return Cursor::End;
        };

        match current.node_at(self.position) {
            Some(node) if self.position == 0 => Cursor::OnHead {
                bucket: self.bucket,
                entry: node.id,
            },
            Some(node) => Cursor::OnChain {
                bucket: self.bucket,
                entry: node.id,
            },
            None => Cursor::first_occupied_from(self.buckets, self.bucket + 1),
        }
    }
}

impl<K, T> Clone for Iter<'_, K, T> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            bucket: self.bucket,
            position: self.position,
        }
    }
}

impl<'a, K, T> Iterator for Iter<'a, K, T> {
    type Item = (&'a K, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.buckets.get(self.bucket) {
            if let Some(node) = current.node_at(self.position) {
                self.position += 1;
                return Some((&node.key, &node.value));
            }
            self.bucket += 1;
            self.position = 0;
        }
        None
    }
}

impl<K, T> FusedIterator for Iter<'_, K, T> {}

/// Iterator over `(key, mutable value)` pairs.
///
/// Created by [`HashTable::iter_mut`](super::HashTable::iter_mut). Walks the
/// same order as [`Iter`], splitting each bucket into its head and chain so
/// no two yielded values alias.
pub struct IterMut<'a, K, T> {
    buckets: std::slice::IterMut<'a, HashBucket<K, T>>,
    head: Option<&'a mut Node<K, T>>,
    chain: Option<vec_deque::IterMut<'a, Node<K, T>>>,
}

impl<'a, K, T> IterMut<'a, K, T> {
    pub(crate) fn new(buckets: &'a mut [HashBucket<K, T>]) -> Self {
        Self {
            buckets: buckets.iter_mut(),
            head: None,
            chain: None,
        }
    }
}

impl<'a, K, T> Iterator for IterMut<'a, K, T> {
    type Item = (&'a K, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.head.take().or_else(|| self.chain.as_mut()?.next()) {
                let Node { key, value, .. } = node;
                return Some((&*key, value));
            }

            if let HashBucket::Occupied { head, chain } = self.buckets.next()? {
                self.head = Some(head);
                self.chain = Some(chain.iter_mut());
            }
        }
    }
}

impl<K, T> FusedIterator for IterMut<'_, K, T> {}

/// Owning iterator over `(key, value)` pairs.
///
/// Created by `HashTable::into_iter`.
pub struct IntoIter<K, T> {
    buckets: std::vec::IntoIter<HashBucket<K, T>>,
    head: Option<Node<K, T>>,
    chain: vec_deque::IntoIter<Node<K, T>>,
}

impl<K, T> IntoIter<K, T> {
    pub(crate) fn new(buckets: Box<[HashBucket<K, T>]>) -> Self {
        Self {
            buckets: buckets.into_vec().into_iter(),
            head: None,
            chain: VecDeque::new().into_iter(),
        }
    }
}

impl<K, T> Iterator for IntoIter<K, T> {
    type Item = (K, T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.head.take().or_else(|| self.chain.next()) {
                return Some((node.key, node.value));
            }

            let (head, chain) = self.buckets.next()?.into_nodes();
            self.head = head;
            self.chain = chain.into_iter();
        }
    }
}

impl<K, T> FusedIterator for IntoIter<K, T> {}
