//! # CINDER Core
//!
//! The containers every other engine subsystem builds its lookups on:
//! resource names, string interning, per-cell grid data.
//!
//! ## Architecture Rules
//!
//! 1. **Allocate up front** - Bucket arrays are sized once, at construction
//! 2. **No hidden growth** - Tables never rehash on their own
//! 3. **Collisions are the slow path** - A bucket's first entry lives inline
//! 4. **Failures are values** - Allocation failure is a `ContainerError`, a
//!    missing key is `None`
//!
//! ## Example
//!
//! ```rust,ignore
//! use cinder_core::{StringHashTable, TableConfig, HashTable};
//!
//! let mut sprites: StringHashTable<u32> = StringHashTable::new(128);
//! *sprites.find_or_add("player/idle".to_string()) = 4;
//!
//! let config = TableConfig::from_file("data/tables/sprites.toml")?;
//! let tuned: HashTable<String, u32, _> = HashTable::from_config(&config)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod containers;
pub mod error;

pub use config::TableConfig;
pub use containers::{
    BucketStats, Cursor, DynamicHashFunc, EntryId, HashFunction, HashKind, HashTable, HashValue,
    SaxHashFunc, StringHashTable,
};
pub use error::{ContainerError, ContainerResult};
