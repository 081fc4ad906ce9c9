//! # Containers
//!
//! Name-keyed lookup tables for the rest of the engine.
//!
//! ## Layout
//!
//! ```text
//!   HashTable
//!   ├── hash function (type parameter)
//!   └── Box<[HashBucket]>      fixed length, chosen at construction
//!         ├── head cell        first entry, stored inline
//!         └── VecDeque chain   collisions, in insertion order
//! ```
//!
//! Resizing only happens when the caller asks for it.

mod bucket;
pub mod hash_function;
mod hash_table;
mod iter;

pub use hash_function::{
    DynamicHashFunc, Djb2HashFunc, FnHashFunc, Fnv1aHashFunc, HashFunction, HashKind, HashValue,
    IdentityHashFunc, JenkinsHashFunc, PodHashFunc, SaxHashFunc, SdbmHashFunc, SipHashFunc,
};
pub use hash_table::{BucketStats, HashTable, StringHashTable};
pub use iter::{Cursor, EntryId, IntoIter, Iter, IterMut};
