//! Prefixed, reversible, obfuscated record IDs.
//!
//! Internal record keys (integers, compound keys, UUIDs) are encoded as
//! opaque strings like `user_k9vn27dg43hqmw8zpetc51xb` and decoded back
//! deterministically. A process-wide prefix registry routes an id to the
//! owning entity type so callers can decode without naming the type.
//!
//! The encoding is an obfuscation, not a security boundary: anyone who
//! knows the alphabet and minimum length can analyze it.

pub mod codec;
pub mod config;
pub mod error;
pub mod key;
pub mod parse;
pub mod registry;

pub use codec::{Decoded, NeatId};
pub use config::{CodecConfig, DEFAULT_ALPHABET, DEFAULT_DELIMITER, DEFAULT_MIN_LENGTH};
pub use error::{NeatIdError, Result};
pub use key::Key;
pub use parse::split_id;
pub use registry::{DecodeHandle, PrefixRegistry, Registration};

use std::sync::Arc;

/// Encodes `key` as a prefixed neat ID without keeping a codec around.
///
/// # Errors
///
/// Same as [`NeatId::with_config`] and [`NeatId::encode`].
pub fn encode<K: Into<Key>>(prefix: &str, config: &CodecConfig, key: K) -> Result<String> {
    NeatId::with_config(prefix, config)?.encode(key)
}

/// Decodes a neat ID without keeping a codec around. Returns `None` when
/// the id fails validation and `fallback` is disabled.
///
/// # Errors
///
/// Same as [`NeatId::with_config`]; decode failures themselves are
/// signaled through the return value, never as errors.
pub fn decode(
    prefix: &str,
    config: &CodecConfig,
    id: &str,
    fallback: bool,
) -> Result<Option<Decoded>> {
    let codec = NeatId::with_config(prefix, config)?;
    Ok(codec.decode_id(id, fallback))
}

/// Claims `prefix` for `type_name` in the process-wide registry.
///
/// # Errors
///
/// Same as [`PrefixRegistry::register`].
pub fn register_prefix(
    prefix: &str,
    type_name: &str,
    handle: Arc<dyn DecodeHandle>,
) -> Result<()> {
    PrefixRegistry::global().register(prefix, type_name, handle)
}

/// Type-agnostic decode through the process-wide registry.
///
/// # Errors
///
/// Same as [`PrefixRegistry::resolve_and_decode`].
pub fn resolve_and_decode(id: &str, fallback: bool) -> Result<Decoded> {
    PrefixRegistry::global().resolve_and_decode(id, fallback)
}
