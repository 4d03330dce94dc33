//! Tagged SHA-256 hashing.
//!
//! Every digest in the tree is a BIP-340 style tagged hash:
//!
//! `tagged_hash(data, tag) = sha256(sha256(tag) || sha256(tag) || data)`
//!
//! Branch nodes hash the *hex text* of their two children, not the raw
//! digest bytes: `combine(left, right) = tagged_hash(hex(left) ||
//! hex(right), tag)`.

use std::{fmt, str::FromStr};

use bincode::{Decode, Encode};
use sha2::{Digest, Sha256};

use crate::error::{Result, TaggedMerkleError, ensure_not_empty};

/// Length of a digest in bytes.
pub const HASH_LENGTH: usize = 32;

/// Length of a digest rendered as hex text.
pub const HASH_HEX_LENGTH: usize = HASH_LENGTH * 2;

/// A 256-bit SHA-256 digest.
///
/// The canonical text form is 64 lowercase hex characters, which is what
/// `Display` prints and what branch hashing consumes.
#[derive(Clone, Copy, PartialEq, Eq, core::hash::Hash, PartialOrd, Ord, Encode, Decode)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Hash(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Lowercase hex form, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64 character lowercase hex string.
    pub fn from_hex(text: &str) -> Result<Self> {
        if text.len() != HASH_HEX_LENGTH {
            return Err(TaggedMerkleError::InvalidArgument(format!(
                "hash must be {} hex characters, got {}",
                HASH_HEX_LENGTH,
                text.len()
            )));
        }
        if !text.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(TaggedMerkleError::InvalidArgument(
                "hash must be lowercase hex".into(),
            ));
        }
        let mut bytes = [0u8; HASH_LENGTH];
        hex::decode_to_slice(text, &mut bytes).map_err(|e| {
            TaggedMerkleError::InvalidArgument(format!("hash is not valid hex: {}", e))
        })?;
        Ok(Hash(bytes))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = TaggedMerkleError;

    fn from_str(s: &str) -> Result<Self> {
        Hash::from_hex(s)
    }
}

impl From<[u8; HASH_LENGTH]> for Hash {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Hash(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Hash {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Hash {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Hash::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 hasher bound to one domain tag.
///
/// The tag is hashed once at construction, so hashing many leaves or
/// branches under the same tag only pays for the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaggedHasher {
    tag_hash: Hash,
}

impl TaggedHasher {
    /// Create a hasher for `tag`. Fails if `tag` is empty.
    pub fn new(tag: &str) -> Result<Self> {
        ensure_not_empty(tag.as_bytes(), "tag")?;
        Ok(Self::new_unchecked(tag))
    }

    /// Create a hasher, reporting an empty tag under `field` (e.g. "leaf
    /// tag").
    pub(crate) fn for_field(tag: &str, field: &str) -> Result<Self> {
        ensure_not_empty(tag.as_bytes(), field)?;
        Ok(Self::new_unchecked(tag))
    }

    fn new_unchecked(tag: &str) -> Self {
        TaggedHasher {
            tag_hash: Hash(Sha256::digest(tag.as_bytes()).into()),
        }
    }

    /// `sha256(tag)`, the prefix mixed into every digest.
    pub fn tag_hash(&self) -> Hash {
        self.tag_hash
    }

    /// Tagged hash of `data`. Fails if `data` is empty.
    pub fn hash(&self, data: impl AsRef<[u8]>) -> Result<Hash> {
        let data = data.as_ref();
        ensure_not_empty(data, "data")?;
        Ok(self.digest(data))
    }

    /// Combine two child hashes into their parent by hashing the
    /// concatenated hex text of `left` and `right`.
    pub fn combine(&self, left: &Hash, right: &Hash) -> Hash {
        let mut text = String::with_capacity(2 * HASH_HEX_LENGTH);
        text.push_str(&left.to_hex());
        text.push_str(&right.to_hex());
        self.digest(text.as_bytes())
    }

    fn digest(&self, data: &[u8]) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.tag_hash.0);
        hasher.update(self.tag_hash.0);
        hasher.update(data);
        Hash(hasher.finalize().into())
    }
}

/// Tagged hash of `data` under `tag`.
///
/// Both `data` and `tag` must be non-empty.
pub fn tagged_hash(data: impl AsRef<[u8]>, tag: &str) -> Result<Hash> {
    TaggedHasher::new(tag)?.hash(data)
}

/// Combine two child hashes under `tag`. Fails if `tag` is empty.
pub fn combine_hashes(left: &Hash, right: &Hash, tag: &str) -> Result<Hash> {
    Ok(TaggedHasher::new(tag)?.combine(left, right))
}
