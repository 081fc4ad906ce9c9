//! # Fixed-Bucket Hash Table
//!
//! Separate chaining with a head cell per bucket.
//!
//! ## Design
//!
//! - The bucket array is allocated once at construction and never resized
//!   behind the caller's back. [`HashTable::rehash`] exists for callers that
//!   decide to resize explicitly.
//! - A key lands in bucket `hash % bucket_count`. No secondary mixing is
//!   applied, so distribution quality is the hash function's job.
//! - A bucket's first entry lives inline; only collisions allocate.
//! - The total entry count is not cached. [`HashTable::len`] walks the
//!   buckets.
//!
//! ## Thread Safety
//!
//! Not synchronized. Wrap the table in a lock to share it between threads.

use std::borrow::Borrow;
use std::collections::VecDeque;
use std::fmt;

use super::bucket::{HashBucket, Node};
use super::hash_function::{DynamicHashFunc, HashFunction, HashValue, SaxHashFunc};
use super::iter::{Cursor, EntryId, IntoIter, Iter, IterMut};
use crate::config::TableConfig;
use crate::error::{ContainerError, ContainerResult};

/// A hash table keyed by owned strings, hashed with [`SaxHashFunc`].
///
/// Lookups accept `&str`.
pub type StringHashTable<T> = HashTable<String, T, SaxHashFunc>;

/// Bucket occupancy summary, for spotting a poor hash function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketStats {
    /// Number of buckets.
    pub bucket_count: usize,
    /// Number of stored entries.
    pub entry_count: usize,
    /// Buckets holding no entry.
    pub empty_buckets: usize,
    /// Entries in the fullest bucket.
    pub longest_bucket: usize,
}

impl BucketStats {
    /// Entries per bucket.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.entry_count as f64 / self.bucket_count as f64
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn reduce(hash: HashValue, bucket_count: usize) -> usize {
    // The remainder is below `bucket_count`, so it fits back into usize.
    (hash % bucket_count as u64) as usize
}

fn allocate<E>(count: usize) -> ContainerResult<Vec<E>> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(count)
        .map_err(|_| ContainerError::AllocationFailed { requested: count })?;
    Ok(storage)
}

fn allocate_buckets<K, T>(bucket_count: usize) -> ContainerResult<Box<[HashBucket<K, T>]>> {
    if bucket_count == 0 {
        return Err(ContainerError::ZeroBuckets);
    }

    let mut buckets = allocate(bucket_count)?;
    buckets.resize_with(bucket_count, || HashBucket::Empty);
    Ok(buckets.into_boxed_slice())
}

/// A hash table with a fixed number of buckets.
///
/// # Type Parameters
///
/// * `K` - Key type
/// * `T` - Value type
/// * `H` - Hash function, see [`super::hash_function`]
///
/// # Example
///
/// ```rust,ignore
/// let mut textures: StringHashTable<u32> = StringHashTable::new(64);
///
/// *textures.find_or_add("atlas".to_string()) = 7;
/// assert_eq!(textures.find("atlas"), Some(&7));
/// assert!(textures.remove("atlas"));
/// ```
pub struct HashTable<K, T, H> {
    buckets: Box<[HashBucket<K, T>]>,
    hash_func: H,
    /// Id for the next inserted entry.
    next_entry: EntryId,
}

impl<K, T, H> HashTable<K, T, H> {
    /// Creates a table with `bucket_count` empty buckets.
    ///
    /// # Errors
    ///
    /// [`ContainerError::ZeroBuckets`] if `bucket_count` is zero,
    /// [`ContainerError::AllocationFailed`] if the bucket array cannot be
    /// allocated.
    pub fn try_with_hasher(bucket_count: usize, hash_func: H) -> ContainerResult<Self> {
        let buckets = allocate_buckets(bucket_count)?;
        tracing::debug!(bucket_count, "hash table created");
        Ok(Self {
            buckets,
            hash_func,
            next_entry: EntryId::new(0),
        })
    }

    /// Creates a table with `bucket_count` empty buckets.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero or the bucket array cannot be
    /// allocated.
    #[must_use]
    pub fn with_hasher(bucket_count: usize, hash_func: H) -> Self {
        assert!(bucket_count > 0, "Bucket count must be greater than zero");

        match Self::try_with_hasher(bucket_count, hash_func) {
            Ok(table) => table,
            Err(error) => panic!("{error}"),
        }
    }

    /// Creates a table using the hash function's default instance.
    ///
    /// # Errors
    ///
    /// See [`HashTable::try_with_hasher`].
    pub fn try_new(bucket_count: usize) -> ContainerResult<Self>
    where
        H: Default,
    {
        Self::try_with_hasher(bucket_count, H::default())
    }

    /// Creates a table using the hash function's default instance.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    #[must_use]
    pub fn new(bucket_count: usize) -> Self
    where
        H: Default,
    {
        Self::with_hasher(bucket_count, H::default())
    }

    /// Returns the number of buckets.
    #[inline]
    #[must_use]
    pub fn bucket_amount(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the table's hash function.
    #[inline]
    #[must_use]
    pub const fn hasher(&self) -> &H {
        &self.hash_func
    }

    /// Counts every entry. O(bucket count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(HashBucket::len).sum()
    }

    /// Returns `true` if no bucket holds an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(HashBucket::is_empty)
    }

    /// Entries per bucket.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.distribution().load_factor()
    }

    /// Summarizes bucket occupancy.
    #[must_use]
    pub fn distribution(&self) -> BucketStats {
        let mut stats = BucketStats {
            bucket_count: self.buckets.len(),
            entry_count: 0,
            empty_buckets: 0,
            longest_bucket: 0,
        };

        for bucket in self.buckets.iter() {
            let size = bucket.len();
            stats.entry_count += size;
            stats.longest_bucket = stats.longest_bucket.max(size);
            if size == 0 {
                stats.empty_buckets += 1;
            }
        }

        stats
    }

    /// Removes every entry. The bucket count is unchanged.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        tracing::trace!(bucket_count = self.buckets.len(), "hash table cleared");
    }

    /// Keeps only the entries for which `keep` returns `true`.
    ///
    /// Entries are visited in iteration order. Returns how many were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &mut T) -> bool,
    {
        self.buckets
            .iter_mut()
            .map(|bucket| bucket.retain(&mut keep))
            .sum()
    }

    /// Exchanges the contents of two tables without copying entries.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.buckets, &mut other.buckets);
        std::mem::swap(&mut self.hash_func, &mut other.hash_func);
        std::mem::swap(&mut self.next_entry, &mut other.next_entry);
    }

    /// Replaces this table with `source`.
    ///
    /// `source` is taken by value, so a copy (`table.assign(other.clone())`)
    /// is complete before this table changes.
    #[inline]
    pub fn assign(&mut self, mut source: Self) {
        self.swap(&mut source);
    }

    /// Iterates over `(key, value)` pairs in bucket order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, T> {
        Iter::new(&self.buckets)
    }

    /// Iterates over `(key, mutable value)` pairs in bucket order.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, K, T> {
        IterMut::new(&mut self.buckets)
    }

    /// Iterates over keys in bucket order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over values in bucket order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Iterates mutably over values in bucket order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.iter_mut().map(|(_, value)| value)
    }

    /// Cursor on the first entry, equal to [`HashTable::end`] when empty.
    #[inline]
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::first(&self.buckets)
    }

    /// The past-the-end cursor.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> Cursor {
        Cursor::End
    }

    /// The cursor following `cursor`.
    #[inline]
    #[must_use]
    pub fn advance(&self, cursor: Cursor) -> Cursor {
        cursor.advance(&self.buckets)
    }

    /// The entry under `cursor`, or `None` for [`Cursor::End`], a removed
    /// entry or a bucket index outside the table.
    ///
    /// Removing other entries never moves a cursor onto a different entry.
    /// A cursor from another table is meaningless here.
    #[must_use]
    pub fn try_at(&self, cursor: Cursor) -> Option<(&K, &T)> {
        let node = cursor.resolve(&self.buckets)?;
        Some((&node.key, &node.value))
    }

    /// Mutable form of [`HashTable::try_at`].
    pub fn try_at_mut(&mut self, cursor: Cursor) -> Option<(&K, &mut T)> {
        let node = cursor.resolve_mut(&mut self.buckets)?;
        Some((&node.key, &mut node.value))
    }

    /// The entry under `cursor`.
    ///
    /// # Panics
    ///
    /// Panics when dereferencing [`Cursor::End`] or a cursor whose entry was
    /// removed.
    #[must_use]
    pub fn at(&self, cursor: Cursor) -> (&K, &T) {
        match self.try_at(cursor) {
            Some(entry) => entry,
            None => panic!("cursor {cursor:?} does not point at an entry"),
        }
    }

    /// The entry under `cursor`, with a mutable value.
    ///
    /// # Panics
    ///
    /// Panics when dereferencing [`Cursor::End`] or a cursor whose entry was
    /// removed.
    pub fn at_mut(&mut self, cursor: Cursor) -> (&K, &mut T) {
        match self.try_at_mut(cursor) {
            Some(entry) => entry,
            None => panic!("cursor {cursor:?} does not point at an entry"),
        }
    }

    /// Deep copy that reports allocation failure.
    ///
    /// # Errors
    ///
    /// [`ContainerError::AllocationFailed`] if any bucket or chain cannot be
    /// copied. Nothing is leaked; the partial copy is dropped.
    pub fn try_clone(&self) -> ContainerResult<Self>
    where
        K: Clone,
        T: Clone,
        H: Clone,
    {
        let mut buckets = allocate(self.buckets.len())?;
        for bucket in self.buckets.iter() {
            buckets.push(bucket.try_clone()?);
        }

        Ok(Self {
            buckets: buckets.into_boxed_slice(),
            hash_func: self.hash_func.clone(),
            next_entry: self.next_entry,
        })
    }

    /// Copy-and-swap assignment from `source`.
    ///
    /// # Errors
    ///
    /// [`ContainerError::AllocationFailed`] if the copy fails, in which case
    /// this table is left exactly as it was.
    pub fn try_assign_from(&mut self, source: &Self) -> ContainerResult<()>
    where
        K: Clone,
        T: Clone,
        H: Clone,
    {
        let mut copy = source.try_clone().map_err(|error| {
            tracing::warn!(%error, "hash table copy failed, destination left unchanged");
            error
        })?;
        self.swap(&mut copy);
        Ok(())
    }

    /// Redistributes every entry over `bucket_count` buckets.
    ///
    /// Never called implicitly. Stored hashes and entry ids are reused, and
    /// every allocation happens before the first entry moves, so on error the
    /// table is untouched. Within each new bucket entries keep insertion
    /// order. A cursor whose entry changed bucket no longer dereferences.
    ///
    /// # Errors
    ///
    /// [`ContainerError::ZeroBuckets`] or [`ContainerError::AllocationFailed`].
    pub fn rehash(&mut self, bucket_count: usize) -> ContainerResult<()> {
        if bucket_count == 0 {
            return Err(ContainerError::ZeroBuckets);
        }

        let mut counts: Vec<usize> = allocate(bucket_count)?;
        counts.resize(bucket_count, 0);
        for bucket in self.buckets.iter() {
            for node in bucket.nodes() {
                counts[reduce(node.hash, bucket_count)] += 1;
            }
        }

        let mut staging: Vec<VecDeque<Node<K, T>>> = allocate(bucket_count)?;
        for &count in &counts {
            let mut nodes = VecDeque::new();
            nodes
                .try_reserve_exact(count)
                .map_err(|_| ContainerError::AllocationFailed { requested: count })?;
            staging.push(nodes);
        }
        let mut rebuilt: Vec<HashBucket<K, T>> = allocate(bucket_count)?;

        let previous = std::mem::take(&mut self.buckets);
        let previous_count = previous.len();
        for bucket in previous.into_vec() {
            let (head, chain) = bucket.into_nodes();
            for node in head.into_iter().chain(chain) {
                staging[reduce(node.hash, bucket_count)].push_back(node);
            }
        }

        rebuilt.extend(staging.into_iter().map(|mut nodes| {
            nodes.make_contiguous().sort_unstable_by_key(|node| node.id);
            HashBucket::from_nodes(nodes)
        }));
        self.buckets = rebuilt.into_boxed_slice();

        tracing::debug!(from = previous_count, to = bucket_count, "hash table rehashed");
        Ok(())
    }
}

impl<K: Eq, T, H: HashFunction<K>> HashTable<K, T, H> {
    /// Returns the hash of `key`.
    #[inline]
    pub fn hash<Q>(&self, key: &Q) -> HashValue
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        HashFunction::<Q>::hash(&self.hash_func, key)
    }

    /// Returns the index of the bucket `key` maps to.
    #[inline]
    pub fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        reduce(self.hash(key), self.buckets.len())
    }

    /// Returns the number of entries in the bucket `key` maps to.
    #[inline]
    pub fn bucket_size<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        self.buckets[self.bucket_index(key)].len()
    }

    /// Returns the value for `key`, inserting `T::default()` first if absent.
    ///
    /// Calling this twice with the same key yields the same slot.
    ///
    /// # Panics
    ///
    /// Panics if the bucket's chain cannot grow. Use
    /// [`HashTable::try_find_or_add`] to handle that case.
    pub fn find_or_add(&mut self, key: K) -> &mut T
    where
        T: Default,
    {
        match self.try_find_or_add(key) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    /// Fallible form of [`HashTable::find_or_add`].
    ///
    /// # Errors
    ///
    /// [`ContainerError::AllocationFailed`] if a colliding key needs a chain
    /// node and none can be allocated.
    pub fn try_find_or_add(&mut self, key: K) -> ContainerResult<&mut T>
    where
        T: Default,
    {
        self.find_or_insert_with(key, T::default)
    }

    /// Returns the value for `key`, inserting `make()` first if absent.
    ///
    /// # Errors
    ///
    /// [`ContainerError::AllocationFailed`] if the chain cannot grow.
    pub fn find_or_insert_with<F>(&mut self, key: K, make: F) -> ContainerResult<&mut T>
    where
        F: FnOnce() -> T,
    {
        let hash = self.hash_func.hash(&key);
        let index = reduce(hash, self.buckets.len());
        let id = self.next_entry;
        let (value, inserted) = self.buckets[index].find_or_insert_with(id, hash, key, make)?;
        if inserted {
            self.next_entry = id.next();
        }
        Ok(value)
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// [`ContainerError::AllocationFailed`] if the chain cannot grow.
    pub fn insert(&mut self, key: K, value: T) -> ContainerResult<Option<T>> {
        let hash = self.hash_func.hash(&key);
        let index = reduce(hash, self.buckets.len());
        let id = self.next_entry;
        let previous = self.buckets[index].insert(id, hash, key, value)?;
        if previous.is_none() {
            self.next_entry = id.next();
        }
        Ok(previous)
    }

    /// Returns a copy of the value for `key`.
    #[must_use]
    pub fn lookup<Q>(&self, key: &Q) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
        T: Clone,
    {
        self.find(key).cloned()
    }

    /// Returns a reference to the value for `key`.
    ///
    /// The reference is valid until the table is next mutated.
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        let hash = self.hash(key);
        self.buckets[reduce(hash, self.buckets.len())]
            .find(hash, key)
            .map(|node| &node.value)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut T>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        let hash = self.hash(key);
        let index = reduce(hash, self.buckets.len());
        self.buckets[index]
            .find_mut(hash, key)
            .map(|node| &mut node.value)
    }

    /// Returns `true` if `key` is stored.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        self.find(key).is_some()
    }

    /// Removes `key`. Returns `false`, leaving the table unchanged, if it was
    /// not stored.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        self.remove_entry(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` and returns the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, T)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: HashFunction<Q>,
    {
        let hash = self.hash(key);
        let index = reduce(hash, self.buckets.len());
        self.buckets[index]
            .remove(hash, key)
            .map(|node| (node.key, node.value))
    }
}

impl<K, T> HashTable<K, T, DynamicHashFunc> {
    /// Creates a table sized and hashed as `config` describes.
    ///
    /// # Errors
    ///
    /// [`ContainerError::ZeroBuckets`] for a zero bucket count, or an
    /// allocation failure.
    pub fn from_config(config: &TableConfig) -> ContainerResult<Self> {
        config.validate()?;
        Self::try_with_hasher(config.bucket_count, config.hash_func())
    }
}

impl<K: Clone, T: Clone, H: Clone> Clone for HashTable<K, T, H> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            hash_func: self.hash_func.clone(),
            next_entry: self.next_entry,
        }
    }

    /// Copy-and-swap: `self` is only touched once the copy exists.
    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap(&mut copy);
    }
}

impl<K: fmt::Debug, T: fmt::Debug, H> fmt::Debug for HashTable<K, T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Eq, T, H: HashFunction<K>> Extend<(K, T)> for HashTable<K, T, H> {
    /// # Panics
    ///
    /// Panics if a chain cannot grow.
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, pairs: I) {
        for (key, value) in pairs {
            if let Err(error) = self.insert(key, value) {
                panic!("{error}");
            }
        }
    }
}

impl<K, T, H> IntoIterator for HashTable<K, T, H> {
    type Item = (K, T);
    type IntoIter = IntoIter<K, T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.buckets)
    }
}

impl<'a, K, T, H> IntoIterator for &'a HashTable<K, T, H> {
    type Item = (&'a K, &'a T);
    type IntoIter = Iter<'a, K, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, T, H> IntoIterator for &'a mut HashTable<K, T, H> {
    type Item = (&'a K, &'a mut T);
    type IntoIter = IterMut<'a, K, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::hash_function::{FnHashFunc, IdentityHashFunc};

    type Colliding = FnHashFunc<u32, fn(&u32) -> HashValue>;

    fn zero(_: &u32) -> HashValue {
        0
    }

    /// Every key hashes to 0, so every entry shares bucket 0.
    fn colliding(bucket_count: usize) -> HashTable<u32, u32, Colliding> {
        HashTable::with_hasher(bucket_count, FnHashFunc::new(zero as fn(&u32) -> HashValue))
    }

    #[test]
    fn test_zero_buckets_rejected() {
        let result = HashTable::<u32, u32, IdentityHashFunc>::try_new(0);
        assert_eq!(result.err(), Some(ContainerError::ZeroBuckets));
    }

    #[test]
    #[should_panic(expected = "Bucket count must be greater than zero")]
    fn test_zero_buckets_panics() {
        let _ = HashTable::<u32, u32, IdentityHashFunc>::new(0);
    }

    #[test]
    fn test_find_or_add_default_then_overwrite() {
        let mut table: HashTable<u32, String, IdentityHashFunc> = HashTable::new(8);
        assert_eq!(table.find_or_add(3).as_str(), "");
        *table.find_or_add(3) = "three".to_string();
        assert_eq!(table.lookup(&3).as_deref(), Some("three"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_bucket_index_is_hash_mod_count() {
        let table: HashTable<u64, u8, IdentityHashFunc> = HashTable::new(7);
        assert_eq!(table.bucket_index(&23), 2);
        assert_eq!(table.hash(&23), 23);
        assert_eq!(table.bucket_amount(), 7);
    }

    #[test]
    fn test_insert_returns_previous() {
        let mut table = colliding(4);
        assert_eq!(table.insert(1, 10).unwrap(), None);
        assert_eq!(table.insert(2, 20).unwrap(), None);
        assert_eq!(table.insert(2, 21).unwrap(), Some(20));
        assert_eq!(table.find(&2), Some(&21));
        assert_eq!(table.bucket_size(&1), 2);
    }

    #[test]
    fn test_head_promotion_through_table() {
        let mut table = colliding(2);
        table.extend([(1, 1), (2, 2), (3, 3)]);
        assert_eq!(table.begin().bucket(), Some(0));
        assert!(table.remove(&1));

        assert_eq!(table.at(table.begin()), (&2, &2));
        let keys: Vec<u32> = table.keys().copied().collect();
        assert_eq!(keys, [2, 3]);
    }

    #[test]
    fn test_remove_absent_leaves_table_alone() {
        let mut table = colliding(2);
        table.extend([(1, 1), (2, 2)]);
        assert!(!table.remove(&9));
        assert_eq!(table.len(), 2);
        assert_eq!(table.take(&2), Some(2));
        assert_eq!(table.remove_entry(&1), Some((1, 1)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_table_begin_is_end() {
        let table: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(16);
        assert_eq!(table.begin(), table.end());
        assert!(table.try_at(table.end()).is_none());
    }

    #[test]
    #[should_panic(expected = "does not point at an entry")]
    fn test_dereferencing_end_panics() {
        let mut table: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(4);
        *table.find_or_add(1) = 1;
        let _ = table.at(table.end());
    }

    #[test]
    fn test_cursor_unaffected_by_other_removals() {
        let mut table = colliding(1);
        table.extend((1..=4).map(|key| (key, key * 10)));

        let on_three = table.advance(table.advance(table.begin()));
        assert_eq!(table.try_at(on_three), Some((&3, &30)));

        assert!(table.remove(&2));
        assert_eq!(table.try_at(on_three), Some((&3, &30)));
        assert!(table.remove(&1));
        assert_eq!(table.try_at_mut(on_three), Some((&3, &mut 30)));
        assert_eq!(table.at(table.advance(on_three)), (&4, &40));

        assert!(table.remove(&3));
        assert!(table.try_at(on_three).is_none());
        assert_eq!(table.at(table.advance(on_three)), (&4, &40));
    }

    #[test]
    #[should_panic(expected = "does not point at an entry")]
    fn test_dereferencing_removed_entry_panics() {
        let mut table = colliding(1);
        table.extend([(1, 1), (2, 2)]);
        let on_two = table.advance(table.begin());
        assert!(table.remove(&2));
        let _ = table.at(on_two);
    }

    #[test]
    fn test_out_of_range_cursor_is_not_an_entry() {
        let mut table = colliding(2);
        table.extend([(1, 1)]);
        let entry = table.begin().entry().unwrap();

        let far = Cursor::OnChain { bucket: usize::MAX, entry };
        assert!(table.try_at(far).is_none());
        assert!(table.try_at_mut(far).is_none());
        assert_eq!(table.advance(far), Cursor::End);
    }

    #[test]
    fn test_reinserted_key_is_a_new_entry() {
        let mut table = colliding(1);
        table.extend([(1, 1), (2, 2)]);
        let on_one = table.begin();
        assert!(table.remove(&1));
        table.extend([(1, 5)]);

        assert!(table.try_at(on_one).is_none());
        let keys: Vec<u32> = table.keys().copied().collect();
        assert_eq!(keys, [2, 1]);
    }

    #[test]
    fn test_cursor_walk_and_mutate() {
        let mut table: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(4);
        table.extend([(1, 1), (5, 5), (2, 2)]);

        let mut cursor = table.begin();
        while cursor != table.end() {
            let (_, value) = table.at_mut(cursor);
            *value *= 100;
            cursor = table.advance(cursor);
        }

        let mut values: Vec<u32> = table.values().copied().collect();
        values.sort_unstable();
        assert_eq!(values, [100, 200, 500]);
    }

    #[test]
    fn test_clear_keeps_buckets() {
        let mut table = colliding(3);
        table.extend([(1, 1), (2, 2)]);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.bucket_amount(), 3);
        assert!(table.find(&1).is_none());
    }

    #[test]
    fn test_retain_counts_removed() {
        let mut table: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(3);
        table.extend((0..12).map(|key| (key, key)));
        let removed = table.retain(|key, _| key % 3 == 0);
        assert_eq!(removed, 8);
        assert_eq!(table.len(), 4);
        assert!(table.contains_key(&9));
        assert!(!table.contains_key(&10));
    }

    #[test]
    fn test_clone_from_is_isolated() {
        let mut source = colliding(2);
        source.extend([(1, 1), (2, 2)]);

        let mut target = colliding(2);
        target.extend([(7, 7)]);
        target.clone_from(&source);
        assert!(!target.contains_key(&7));

        assert!(target.remove(&1));
        assert_eq!(source.find(&1), Some(&1));
    }

    #[test]
    fn test_try_assign_from_and_assign() {
        let mut source: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(4);
        source.extend([(1, 10), (2, 20)]);

        let mut target: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(16);
        target.try_assign_from(&source).unwrap();
        assert_eq!(target.bucket_amount(), 4);
        assert_eq!(target.lookup(&2), Some(20));

        let mut other: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(2);
        other.assign(target.try_clone().unwrap());
        assert_eq!(other.len(), 2);
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn test_rehash_keeps_insertion_order_and_cursors() {
        let mut table: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(2);
        table.extend((0..6).map(|key| (key, key)));
        let second_bucket = table.advance(table.advance(table.advance(table.begin())));
        assert_eq!(table.at(second_bucket), (&1, &1));

        table.rehash(1).unwrap();
        let keys: Vec<u32> = table.keys().copied().collect();
        assert_eq!(keys, [0, 1, 2, 3, 4, 5]);
        assert!(table.try_at(second_bucket).is_none());

        let on_one = table.advance(table.begin());
        assert_eq!(table.at(on_one).0, &1);
        assert!(table.remove(&0));
        assert_eq!(table.at(on_one).0, &1);
    }

    #[test]
    fn test_rehash_keeps_entries() {
        let mut table: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(2);
        table.extend((0..50).map(|key| (key, key * 2)));
        assert_eq!(table.distribution().longest_bucket, 25);

        table.rehash(64).unwrap();
        assert_eq!(table.bucket_amount(), 64);
        assert_eq!(table.len(), 50);
        assert_eq!(table.distribution().longest_bucket, 1);
        for key in 0..50 {
            assert_eq!(table.find(&key), Some(&(key * 2)));
            assert_eq!(table.bucket_index(&key), key as usize);
        }

        assert_eq!(table.rehash(0), Err(ContainerError::ZeroBuckets));
        assert_eq!(table.bucket_amount(), 64);
    }

    #[test]
    fn test_distribution() {
        let mut table = colliding(4);
        table.extend([(1, 1), (2, 2), (3, 3)]);
        let stats = table.distribution();
        assert_eq!(stats.bucket_count, 4);
        assert_eq!(stats.entry_count, 3);
        assert_eq!(stats.empty_buckets, 3);
        assert_eq!(stats.longest_bucket, 3);
        assert!((stats.load_factor() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_string_table_borrowed_lookup() {
        let mut names: StringHashTable<u32> = StringHashTable::new(8);
        *names.find_or_add("hero".to_string()) = 1;
        assert_eq!(names.find("hero"), Some(&1));
        assert!(names.contains_key("hero"));
        assert!(names.remove("hero"));
    }

    #[test]
    fn test_debug_output() {
        let mut table: HashTable<u32, u32, IdentityHashFunc> = HashTable::new(4);
        *table.find_or_add(1) = 2;
        assert_eq!(format!("{table:?}"), "{1: 2}");
    }
}
