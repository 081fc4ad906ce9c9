//! # Hash Functions
//!
//! The engine's set of pluggable hash functions.
//!
//! A [`HashTable`](super::HashTable) is parameterized over one of these. The
//! table reduces the value with a plain `hash % bucket_count` and applies no
//! perturbation of its own, so bucket skew is entirely a property of the
//! function chosen here.
//!
//! ## Which One?
//!
//! | Function | Keys | Notes |
//! |----------|------|-------|
//! | [`SaxHashFunc`] | strings, byte slices | Default for string tables |
//! | [`Fnv1aHashFunc`] | strings, byte slices | Better avalanche than SAX |
//! | [`Djb2HashFunc`] / [`SdbmHashFunc`] | strings, byte slices | Classic, cheap |
//! | [`JenkinsHashFunc`] | strings, byte slices | One-at-a-time, 32-bit result |
//! | [`IdentityHashFunc`] | integers | Key is its own hash |
//! | [`SipHashFunc`] | anything `Hash` | Keyed, for untrusted input |
//! | [`PodHashFunc`] | `bytemuck::Pod` values | Hashes the raw bytes |
//! | [`DynamicHashFunc`] | strings, byte slices | Picked at run time from config |

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// The value produced by every hash function.
pub type HashValue = u64;

/// Maps a key to a [`HashValue`].
///
/// Implementations must be deterministic for the lifetime of a table: the
/// same key always hashes to the same value. When a table is looked up
/// through a borrowed form `Q` of its key type `K`, the function must hash
/// `Q` and `K` identically.
pub trait HashFunction<K: ?Sized> {
    /// Hashes a key.
    fn hash(&self, key: &K) -> HashValue;
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

fn sax(bytes: &[u8]) -> HashValue {
    bytes.iter().fold(0, |hash: u64, &byte| {
        hash ^ (hash << 5).wrapping_add(hash >> 2).wrapping_add(u64::from(byte))
    })
}

fn djb2(bytes: &[u8]) -> HashValue {
    bytes.iter().fold(5381, |hash: u64, &byte| {
        hash.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

fn sdbm(bytes: &[u8]) -> HashValue {
    bytes.iter().fold(0, |hash: u64, &byte| {
        u64::from(byte)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash)
    })
}

fn jenkins_one_at_a_time(bytes: &[u8]) -> HashValue {
    let mut hash = bytes.iter().fold(0, |mut hash: u32, &byte| {
        hash = hash.wrapping_add(u32::from(byte));
        hash = hash.wrapping_add(hash << 10);
        hash ^ (hash >> 6)
    });
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    u64::from(hash)
}

fn fnv1a(bytes: &[u8]) -> HashValue {
    bytes.iter().fold(FNV_OFFSET, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

macro_rules! byte_hash_func {
    ($(#[$meta:meta])* $name:ident, $algorithm:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl<K: AsRef<[u8]> + ?Sized> HashFunction<K> for $name {
            #[inline]
            fn hash(&self, key: &K) -> HashValue {
                $algorithm(key.as_ref())
            }
        }
    };
}

byte_hash_func!(
    /// Shift-add-xor hash. The default for string-keyed tables.
    SaxHashFunc,
    sax
);

byte_hash_func!(
    /// Dan Bernstein's `hash * 33 + byte`.
    Djb2HashFunc,
    djb2
);

byte_hash_func!(
    /// The sdbm database hash.
    SdbmHashFunc,
    sdbm
);

byte_hash_func!(
    /// Bob Jenkins' one-at-a-time hash. Produces 32 significant bits.
    JenkinsHashFunc,
    jenkins_one_at_a_time
);

byte_hash_func!(
    /// 64-bit FNV-1a.
    Fnv1aHashFunc,
    fnv1a
);

/// Uses an integer key as its own hash.
///
/// Signed keys are reinterpreted as their two's complement bits, so `-1i32`
/// and `u32::MAX` share a hash but never share a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityHashFunc;

macro_rules! identity_hash {
    ($($int:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl HashFunction<$int> for IdentityHashFunc {
                #[inline]
                #[allow(
                    clippy::cast_sign_loss,
                    clippy::cast_possible_truncation,
                    clippy::unnecessary_cast
                )]
                fn hash(&self, key: &$int) -> HashValue {
                    *key as $unsigned as HashValue
                }
            }
        )*
    };
}

identity_hash!(
    u8 => u8, u16 => u16, u32 => u32, u64 => u64, usize => usize,
    i8 => u8, i16 => u16, i32 => u32, i64 => u64, isize => usize,
);

/// Keyed SipHash-1-3 over any [`Hash`] key.
///
/// Use this when keys come from outside the process: without the keys an
/// attacker cannot aim every entry at one bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SipHashFunc {
    k0: u64,
    k1: u64,
}

impl SipHashFunc {
    /// Creates a SipHash function with the given 128-bit key.
    #[inline]
    #[must_use]
    pub const fn new_with_keys(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }

    /// Returns the two key halves.
    #[inline]
    #[must_use]
    pub const fn keys(&self) -> (u64, u64) {
        (self.k0, self.k1)
    }
}

impl<K: Hash + ?Sized> HashFunction<K> for SipHashFunc {
    #[inline]
    fn hash(&self, key: &K) -> HashValue {
        let mut hasher = SipHasher13::new_with_keys(self.k0, self.k1);
        key.hash(&mut hasher);
        hasher.finish()
    }
}

/// Hashes a plain-old-data key through its in-memory bytes.
///
/// # Type Parameters
///
/// * `F` - The byte hash applied to the key's bytes
///
/// # Example
///
/// ```rust,ignore
/// let mut cells: HashTable<[i32; 2], u16, PodHashFunc> = HashTable::new(256);
/// *cells.find_or_add([4, -7]) = 3;
/// ```
pub struct PodHashFunc<F = Fnv1aHashFunc> {
    bytes: F,
}

impl<F> PodHashFunc<F> {
    /// Wraps a byte hash function.
    #[inline]
    #[must_use]
    pub const fn new(bytes: F) -> Self {
        Self { bytes }
    }
}

impl<F: Default> Default for PodHashFunc<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: Clone> Clone for PodHashFunc<F> {
    fn clone(&self) -> Self {
        Self::new(self.bytes.clone())
    }
}

impl<F: std::fmt::Debug> std::fmt::Debug for PodHashFunc<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodHashFunc").field("bytes", &self.bytes).finish()
    }
}

impl<K: bytemuck::Pod, F: HashFunction<[u8]>> HashFunction<K> for PodHashFunc<F> {
    #[inline]
    fn hash(&self, key: &K) -> HashValue {
        self.bytes.hash(bytemuck::bytes_of(key))
    }
}

/// Byte hash algorithms selectable at run time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashKind {
    /// [`SaxHashFunc`]
    #[default]
    Sax,
    /// [`Djb2HashFunc`]
    Djb2,
    /// [`SdbmHashFunc`]
    Sdbm,
    /// [`JenkinsHashFunc`]
    Jenkins,
    /// [`Fnv1aHashFunc`]
    Fnv1a,
    /// [`SipHashFunc`] over the key's bytes
    Sip,
}

/// A byte hash whose algorithm is chosen at run time, typically from a
/// [`TableConfig`](crate::config::TableConfig).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DynamicHashFunc {
    kind: HashKind,
    sip: SipHashFunc,
}

impl DynamicHashFunc {
    /// Creates a run-time hash function. `sip` is only consulted for
    /// [`HashKind::Sip`].
    #[inline]
    #[must_use]
    pub const fn new(kind: HashKind, sip: SipHashFunc) -> Self {
        Self { kind, sip }
    }

    /// Returns the selected algorithm.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> HashKind {
        self.kind
    }
}

impl<K: AsRef<[u8]> + ?Sized> HashFunction<K> for DynamicHashFunc {
    fn hash(&self, key: &K) -> HashValue {
        let bytes = key.as_ref();
        match self.kind {
            HashKind::Sax => sax(bytes),
            HashKind::Djb2 => djb2(bytes),
            HashKind::Sdbm => sdbm(bytes),
            HashKind::Jenkins => jenkins_one_at_a_time(bytes),
            HashKind::Fnv1a => fnv1a(bytes),
            HashKind::Sip => self.sip.hash(bytes),
        }
    }
}

/// Adapts any closure or function pointer into a [`HashFunction`].
///
/// Handy in tests that need to force collisions.
pub struct FnHashFunc<K: ?Sized, F> {
    func: F,
    _phantom: PhantomData<fn(&K)>,
}

impl<K: ?Sized, F: Fn(&K) -> HashValue> FnHashFunc<K, F> {
    /// Wraps a function.
    #[inline]
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _phantom: PhantomData,
        }
    }
}

impl<K: ?Sized, F: Clone> Clone for FnHashFunc<K, F> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<K: ?Sized, F> std::fmt::Debug for FnHashFunc<K, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnHashFunc")
    }
}

impl<K: ?Sized, F: Fn(&K) -> HashValue> HashFunction<K> for FnHashFunc<K, F> {
    #[inline]
    fn hash(&self, key: &K) -> HashValue {
        (self.func)(key)
    }
}
