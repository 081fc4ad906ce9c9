//! # Hash Bucket
//!
//! One slot of a hash table: a head cell stored inline plus an overflow chain.
//!
//! ```text
//!   Empty                      no entries, no allocation
//!   Occupied { head, [] }      one entry, still no allocation
//!   Occupied { head, [B, C] }  collisions spill into the chain
//! ```
//!
//! The chain keeps insertion order. Removing the head promotes the chain's
//! front node, so `A, [B, C]` becomes `B, [C]`.
//!
//! Every node carries the [`EntryId`] it was given on insertion. Ids are
//! unique within a table and strictly increase from the head to the chain's
//! back, which lets a cursor find its entry again after other entries of the
//! bucket were removed.

use std::borrow::Borrow;
use std::collections::VecDeque;

use super::hash_function::HashValue;
use super::iter::EntryId;
use crate::error::{ContainerError, ContainerResult};

/// A stored entry.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, T> {
    pub(crate) id: EntryId,
    pub(crate) hash: HashValue,
    pub(crate) key: K,
    pub(crate) value: T,
}

impl<K, T> Node<K, T> {
    #[inline]
    pub(crate) const fn new(id: EntryId, hash: HashValue, key: K, value: T) -> Self {
        Self {
            id,
            hash,
            key,
            value,
        }
    }

    /// Identity is `(hash, key)`: the hash is compared first so most
    /// mismatches never touch the key.
    #[inline]
    pub(crate) fn matches<Q>(&self, hash: HashValue, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

/// Head-cell-plus-chain bucket.
#[derive(Clone, Debug)]
pub(crate) enum HashBucket<K, T> {
    /// No entries.
    Empty,
    /// At least one entry. The chain never repeats the head's `(hash, key)`,
    /// and ids increase from `head` through `chain`.
    Occupied {
        head: Node<K, T>,
        chain: VecDeque<Node<K, T>>,
    },
}

impl<K, T> HashBucket<K, T> {
    /// Number of entries in this bucket.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Occupied { chain, .. } => chain.len() + 1,
        }
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Drops every entry.
    #[inline]
    pub(crate) fn clear(&mut self) {
        *self = Self::Empty;
    }

    /// Entry at `position`, where 0 is the head and `n` is chain node `n - 1`.
    #[inline]
    pub(crate) fn node_at(&self, position: usize) -> Option<&Node<K, T>> {
        match self {
            Self::Empty => None,
            Self::Occupied { head, .. } if position == 0 => Some(head),
            Self::Occupied { chain, .. } => chain.get(position - 1),
        }
    }

    /// The entry with `id`, wherever promotion has moved it to.
    pub(crate) fn entry(&self, id: EntryId) -> Option<&Node<K, T>> {
        match self {
            Self::Empty => None,
            Self::Occupied { head, .. } if head.id == id => Some(head),
            Self::Occupied { chain, .. } => chain
                .binary_search_by_key(&id, |node| node.id)
                .ok()
                .and_then(|index| chain.get(index)),
        }
    }

    /// Mutable form of [`Self::entry`].
    pub(crate) fn entry_mut(&mut self, id: EntryId) -> Option<&mut Node<K, T>> {
        match self {
            Self::Empty => None,
            Self::Occupied { head, .. } if head.id == id => Some(head),
            Self::Occupied { chain, .. } => match chain.binary_search_by_key(&id, |node| node.id) {
                Ok(index) => chain.get_mut(index),
                Err(_) => None,
            },
        }
    }

    /// The first entry stored after `id`, whether or not `id` is still here.
    ///
    /// Returns the entry's id and `true` when it sits in the head cell.
    pub(crate) fn successor(&self, id: EntryId) -> Option<(EntryId, bool)> {
        let Self::Occupied { head, chain } = self else {
            return None;
        };
        if head.id > id {
            return Some((head.id, true));
        }

        let index = chain.partition_point(|node| node.id <= id);
        chain.get(index).map(|node| (node.id, false))
    }

    /// Id of the head cell.
    #[inline]
    pub(crate) const fn head_id(&self) -> Option<EntryId> {
        match self {
            Self::Empty => None,
            Self::Occupied { head, .. } => Some(head.id),
        }
    }

    /// Every entry in bucket order.
    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Node<K, T>> {
        let (head, chain) = match self {
            Self::Empty => (None, None),
            Self::Occupied { head, chain } => (Some(head), Some(chain)),
        };
        head.into_iter().chain(chain.into_iter().flatten())
    }

    /// Finds an entry without mutating the bucket. Head first, then the chain.
    pub(crate) fn find<Q>(&self, hash: HashValue, key: &Q) -> Option<&Node<K, T>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match self {
            Self::Empty => None,
            Self::Occupied { head, .. } if head.matches(hash, key) => Some(head),
            Self::Occupied { chain, .. } => chain.iter().find(|node| node.matches(hash, key)),
        }
    }

    /// Same search as [`Self::find`], returning the node mutably.
    pub(crate) fn find_mut<Q>(&mut self, hash: HashValue, key: &Q) -> Option<&mut Node<K, T>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match self {
            Self::Empty => None,
            Self::Occupied { head, .. } if head.matches(hash, key) => Some(head),
            Self::Occupied { chain, .. } => chain.iter_mut().find(|node| node.matches(hash, key)),
        }
    }

    /// The upsert primitive.
    ///
    /// Returns the value slot for `key` and whether it was created by this
    /// call. `make` runs only for a new key, which is stored under `id`;
    /// `id` must exceed every id already in the bucket. An empty bucket takes
    /// the key into its head cell without allocating; otherwise a new key is
    /// appended to the chain, which is reserved fallibly first.
    pub(crate) fn find_or_insert_with<F>(
        &mut self,
        id: EntryId,
        hash: HashValue,
        key: K,
        make: F,
    ) -> ContainerResult<(&mut T, bool)>
    where
        K: Eq,
        F: FnOnce() -> T,
    {
        match self {
            Self::Empty => {
                *self = Self::Occupied {
                    head: Node::new(id, hash, key, make()),
                    chain: VecDeque::new(),
                };
                match self {
                    Self::Occupied { head, .. } => Ok((&mut head.value, true)),
                    Self::Empty => unreachable!("bucket was occupied above"),
                }
            }
            Self::Occupied { head, chain } => {
                if head.matches(hash, &key) {
                    return Ok((&mut head.value, false));
                }
                if let Some(index) = chain.iter().position(|node| node.matches(hash, &key)) {
                    return Ok((&mut chain[index].value, false));
                }

                chain
                    .try_reserve(1)
                    .map_err(|_| ContainerError::AllocationFailed { requested: 1 })?;
                let index = chain.len();
                chain.push_back(Node::new(id, hash, key, make()));
                Ok((&mut chain[index].value, true))
            }
        }
    }

    /// Stores `value` under `key` in one scan, returning the value it
    /// replaced. A new key is stored under `id`, as in
    /// [`Self::find_or_insert_with`].
    pub(crate) fn insert(
        &mut self,
        id: EntryId,
        hash: HashValue,
        key: K,
        value: T,
    ) -> ContainerResult<Option<T>>
    where
        K: Eq,
    {
        match self {
            Self::Empty => {
                *self = Self::Occupied {
                    head: Node::new(id, hash, key, value),
                    chain: VecDeque::new(),
                };
                Ok(None)
            }
            Self::Occupied { head, chain } => {
                if head.matches(hash, &key) {
                    return Ok(Some(std::mem::replace(&mut head.value, value)));
                }
                if let Some(node) = chain.iter_mut().find(|node| node.matches(hash, &key)) {
                    return Ok(Some(std::mem::replace(&mut node.value, value)));
                }

                chain
                    .try_reserve(1)
                    .map_err(|_| ContainerError::AllocationFailed { requested: 1 })?;
                chain.push_back(Node::new(id, hash, key, value));
                Ok(None)
            }
        }
    }

    /// Removes the entry for `key` and returns it.
    ///
    /// A removed head is replaced by the chain's front node; a removed chain
    /// node is erased in place. The bucket is unchanged when nothing matches.
    pub(crate) fn remove<Q>(&mut self, hash: HashValue, key: &Q) -> Option<Node<K, T>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let Self::Occupied { head, chain } = self else {
            return None;
        };

        if head.matches(hash, key) {
            return match chain.pop_front() {
                Some(promoted) => Some(std::mem::replace(head, promoted)),
                None => match std::mem::replace(self, Self::Empty) {
                    Self::Occupied { head, .. } => Some(head),
                    Self::Empty => None,
                },
            };
        }

        let index = chain.iter().position(|node| node.matches(hash, key))?;
        chain.remove(index)
    }

    /// Keeps only the entries for which `keep` returns `true`, visiting them
    /// in bucket order. Returns the number of entries removed.
    pub(crate) fn retain<F>(&mut self, keep: &mut F) -> usize
    where
        F: FnMut(&K, &mut T) -> bool,
    {
        let Self::Occupied { head, chain } = self else {
            return 0;
        };

        let before = chain.len() + 1;
        let keep_head = keep(&head.key, &mut head.value);
        chain.retain_mut(|node| keep(&node.key, &mut node.value));

        if !keep_head {
            match chain.pop_front() {
                Some(promoted) => *head = promoted,
                None => *self = Self::Empty,
            }
        }

        before - self.len()
    }

    /// Moves every entry out, head first.
    pub(crate) fn into_nodes(self) -> (Option<Node<K, T>>, VecDeque<Node<K, T>>) {
        match self {
            Self::Empty => (None, VecDeque::new()),
            Self::Occupied { head, chain } => (Some(head), chain),
        }
    }

    /// Builds a bucket from nodes in bucket order.
    pub(crate) fn from_nodes(mut nodes: VecDeque<Node<K, T>>) -> Self {
        match nodes.pop_front() {
            Some(head) => Self::Occupied { head, chain: nodes },
            None => Self::Empty,
        }
    }

    /// Deep copy that reports allocation failure instead of aborting.
    pub(crate) fn try_clone(&self) -> ContainerResult<Self>
    where
        K: Clone,
        T: Clone,
    {
        match self {
            Self::Empty => Ok(Self::Empty),
            Self::Occupied { head, chain } => {
                let mut copy = VecDeque::new();
                copy.try_reserve_exact(chain.len())
                    .map_err(|_| ContainerError::AllocationFailed {
                        requested: chain.len(),
                    })?;
                copy.extend(chain.iter().cloned());
                Ok(Self::Occupied {
                    head: head.clone(),
                    chain: copy,
                })
            }
        }
    }
}
