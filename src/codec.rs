use sqids::Sqids;

use crate::config::CodecConfig;
use crate::error::{NeatIdError, Result};
use crate::key::Key;
use crate::parse::split_id;

/// Token prepended to every encoded sequence. Decoding any string the
/// permutation codec can syntactically digest may "succeed", so validity
/// hinges on this leading token, not on parseability. The value matches
/// ids minted by earlier implementations and must not change.
const SENTINEL: u64 = 123;

/// Outcome of a fallback-enabled decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The id was produced by this codec; here is the original key.
    Key(Key),
    /// The id was not produced by this codec; the input is passed through
    /// unchanged so legacy, non-obfuscated identifiers keep working.
    Raw(String),
}

impl Decoded {
    pub fn key(self) -> Option<Key> {
        match self {
            Self::Key(key) => Some(key),
            Self::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// Reversible codec for one entity type's neat IDs.
///
/// Encodes a record key as `<prefix><delimiter><payload>`, where the
/// payload is a sentinel-guarded, alphabet-permuted encoding of the key's
/// integer sequence. Stateless after construction and safe to share
/// across threads.
#[derive(Debug)]
pub struct NeatId {
    prefix: String,
    delimiter: String,
    sqids: Sqids,
}

impl NeatId {
    /// Creates a codec with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPrefix` if `prefix` is empty.
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        Self::with_config(prefix, &CodecConfig::default())
    }

    /// Creates a codec with a custom alphabet, minimum length, or
    /// delimiter.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPrefix` if `prefix` is empty, or `Config` if the
    /// permutation codec rejects the alphabet.
    pub fn with_config(prefix: impl Into<String>, config: &CodecConfig) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(NeatIdError::EmptyPrefix);
        }
        let sqids = Sqids::builder()
            .alphabet(config.alphabet.chars().collect())
            .min_length(config.min_length)
            .build()?;
        Ok(Self {
            prefix,
            delimiter: config.delimiter.clone(),
            sqids,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Encodes a record key as a prefixed neat ID.
    ///
    /// The result is deterministic for a fixed key and configuration,
    /// always starts with `prefix + delimiter`, and its payload is at
    /// least `min_length` characters.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the permutation codec fails to produce a
    /// payload.
    pub fn encode<K: Into<Key>>(&self, key: K) -> Result<String> {
        let mut numbers = vec![SENTINEL];
        numbers.extend(key.into().to_numbers());
        let payload = self.sqids.encode(&numbers)?;
        Ok(format!("{}{}{}", self.prefix, self.delimiter, payload))
    }

    /// Encodes an optional key; an absent key encodes to an absent id.
    ///
    /// # Errors
    ///
    /// Same as [`Self::encode`].
    pub fn encode_opt<K: Into<Key>>(&self, key: Option<K>) -> Result<Option<String>> {
        key.map(|k| self.encode(k)).transpose()
    }

    /// Encodes a batch of keys, preserving order.
    ///
    /// # Errors
    ///
    /// Same as [`Self::encode`]; fails on the first key that does.
    pub fn encode_many<K, I>(&self, keys: I) -> Result<Vec<String>>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
    {
        keys.into_iter().map(|k| self.encode(k)).collect()
    }

    /// Decodes a neat ID back into the original key.
    ///
    /// The payload is whatever follows the last delimiter, so callers may
    /// pass the full prefixed id or just the bare payload. Returns `None`
    /// when the payload was not produced by this codec (wrong alphabet,
    /// foreign prefix, plain legacy id, garbage).
    pub fn decode(&self, id: &str) -> Option<Key> {
        self.decode_numbers(id).map(Key::from_numbers)
    }

    /// Decodes with legacy pass-through: an id this codec cannot claim is
    /// returned unchanged as [`Decoded::Raw`] instead of being rejected.
    pub fn decode_with_fallback(&self, id: &str) -> Decoded {
        self.decode(id).map_or_else(
            || Decoded::Raw(id.to_string()),
            Decoded::Key,
        )
    }

    /// Decodes, treating anything this codec cannot claim as a hard error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` when the payload fails validation.
    pub fn decode_strict(&self, id: &str) -> Result<Key> {
        self.decode(id)
            .ok_or_else(|| NeatIdError::InvalidIdentifier { id: id.to_string() })
    }

    /// Decodes a batch of ids, preserving order; invalid entries are
    /// `None`.
    pub fn decode_many<I, S>(&self, ids: I) -> Vec<Option<Key>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().map(|id| self.decode(id.as_ref())).collect()
    }

    /// Shared decode path: isolate the payload, run the permutation
    /// codec, check the sentinel. Malformed input never errors out of the
    /// permutation codec; it surfaces as a sequence that fails the
    /// sentinel check.
    fn decode_numbers(&self, id: &str) -> Option<Vec<u64>> {
        let (_, payload) = split_id(id, &self.delimiter);
        let mut numbers = self.sqids.decode(payload);
        if numbers.len() >= 2 && numbers[0] == SENTINEL {
            numbers.remove(0);
            Some(numbers)
        } else {
            None
        }
    }
}
