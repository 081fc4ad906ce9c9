//! # Table Configuration
//!
//! Hash table sizing lives in TOML next to the rest of the engine's data, so
//! a skewed table can be retuned without a rebuild.
//!
//! ```toml
//! bucket_count = 256
//! hash = "fnv1a"
//! ```
//!
//! `hash` is one of `sax`, `djb2`, `sdbm`, `jenkins`, `fnv1a` or `sip`. With
//! `sip`, `sip_keys = [k0, k1]` sets the 128-bit key. TOML integers stop at
//! `i64::MAX`, so each half may also be a string, hex with a `0x` prefix or
//! decimal:
//!
//! ```toml
//! hash = "sip"
//! sip_keys = ["0xf00d_cafe_dead_beef", 42]
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

use crate::containers::{DynamicHashFunc, HashKind, SipHashFunc};
use crate::error::{ContainerError, ContainerResult};

/// Sizing and hashing for one table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Number of buckets. Must be at least 1.
    pub bucket_count: usize,
    /// Hash algorithm.
    pub hash: HashKind,
    /// SipHash key, used only when `hash = "sip"`. Written back as hex
    /// strings.
    #[serde(with = "sip_keys_format")]
    pub sip_keys: [u64; 2],
}

mod sip_keys_format {
    use super::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum KeyHalf {
        Integer(u64),
        Text(String),
    }

    impl KeyHalf {
        fn value(self) -> Result<u64, String> {
            let text = match self {
                Self::Integer(value) => return Ok(value),
                Self::Text(text) => text.replace('_', ""),
            };
            let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => text.parse(),
            };
            parsed.map_err(|error| format!("invalid sip key {text:?}: {error}"))
        }
    }

    pub(super) fn serialize<S>(keys: &[u64; 2], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [format!("{:#018x}", keys[0]), format!("{:#018x}", keys[1])].serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<[u64; 2], D::Error>
    where
        D: Deserializer<'de>,
    {
        let [k0, k1] = <[KeyHalf; 2]>::deserialize(deserializer)?;
        Ok([
            k0.value().map_err(serde::de::Error::custom)?,
            k1.value().map_err(serde::de::Error::custom)?,
        ])
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            bucket_count: 32,
            hash: HashKind::Sax,
            sip_keys: [0, 0],
        }
    }
}

impl TableConfig {
    /// Default hashing with a custom bucket count.
    #[must_use]
    pub const fn with_buckets(bucket_count: usize) -> Self {
        Self {
            bucket_count,
            hash: HashKind::Sax,
            sip_keys: [0, 0],
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ContainerError::InvalidConfig`] for malformed TOML or unknown keys,
    /// [`ContainerError::ZeroBuckets`] for a zero bucket count.
    pub fn from_toml_str(source: &str) -> ContainerResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|error| ContainerError::InvalidConfig(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ContainerError::ConfigRead`] if the file cannot be read, otherwise
    /// as [`TableConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|error| ContainerError::ConfigRead {
            path: path.display().to_string(),
            reason: error.to_string(),
        })?;

        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            path = %path.display(),
            bucket_count = config.bucket_count,
            hash = ?config.hash,
            "table config loaded"
        );
        Ok(config)
    }

    /// Checks the invariants a table relies on.
    ///
    /// # Errors
    ///
    /// [`ContainerError::ZeroBuckets`] if `bucket_count` is zero.
    pub fn validate(&self) -> ContainerResult<()> {
        if self.bucket_count == 0 {
            return Err(ContainerError::ZeroBuckets);
        }
        Ok(())
    }

    /// The hash function this configuration selects.
    #[must_use]
    pub const fn hash_func(&self) -> DynamicHashFunc {
        DynamicHashFunc::new(
            self.hash,
            SipHashFunc::new_with_keys(self.sip_keys[0], self.sip_keys[1]),
        )
    }
}
