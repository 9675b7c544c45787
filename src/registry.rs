use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::codec::{Decoded, NeatId};
use crate::config::DEFAULT_DELIMITER;
use crate::error::{NeatIdError, Result};
use crate::parse::split_id;

/// The one capability a registered entity type exposes: decode an id that
/// routed to it. `fallback` selects between pass-through and rejection for
/// ids that fail validation, exactly as on [`NeatId`].
///
/// Implemented by [`NeatId`] directly; applications that need to attach
/// their own lookup logic implement it on an adapter instead.
pub trait DecodeHandle: Send + Sync {
    fn decode_id(&self, id: &str, fallback: bool) -> Option<Decoded>;
}

impl DecodeHandle for NeatId {
    fn decode_id(&self, id: &str, fallback: bool) -> Option<Decoded> {
        match self.decode(id) {
            Some(key) => Some(Decoded::Key(key)),
            None if fallback => Some(Decoded::Raw(id.to_string())),
            None => None,
        }
    }
}

/// A registry entry: the owning type's name plus its decode capability.
#[derive(Clone)]
pub struct Registration {
    type_name: String,
    handle: Arc<dyn DecodeHandle>,
}

impl Registration {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn decode(&self, id: &str, fallback: bool) -> Option<Decoded> {
        self.handle.decode_id(id, fallback)
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Process-wide mapping from prefix to owning entity type, used to route a
/// bare neat ID to the right codec without the caller knowing the type.
///
/// Constructible so tests and embedded uses get isolated instances; the
/// shared process-wide table is [`PrefixRegistry::global`]. Writes are
/// expected only during single-threaded setup; reads may be concurrent.
pub struct PrefixRegistry {
    delimiter: String,
    entries: RwLock<HashMap<String, Registration>>,
}

static GLOBAL: Lazy<PrefixRegistry> = Lazy::new(PrefixRegistry::new);

impl PrefixRegistry {
    pub fn new() -> Self {
        Self::with_delimiter(DEFAULT_DELIMITER)
    }

    /// A registry that splits incoming ids on a non-default delimiter.
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide default registry.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Claims `prefix` for `type_name`.
    ///
    /// Re-registering the same prefix for the same type name is an
    /// idempotent no-op. Existing entries are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePrefix` when the prefix is already claimed by a
    /// different type (registry state is left untouched), or
    /// `EmptyPrefix` for an empty prefix.
    pub fn register(
        &self,
        prefix: impl Into<String>,
        type_name: impl Into<String>,
        handle: Arc<dyn DecodeHandle>,
    ) -> Result<()> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(NeatIdError::EmptyPrefix);
        }
        let type_name = type_name.into();
        let mut entries = self.entries.write().expect("prefix registry lock poisoned");
        if let Some(existing) = entries.get(&prefix) {
            if existing.type_name == type_name {
                return Ok(());
            }
            return Err(NeatIdError::DuplicatePrefix {
                prefix,
                existing: existing.type_name.clone(),
            });
        }
        entries.insert(prefix, Registration { type_name, handle });
        Ok(())
    }

    /// Routes a neat ID to its owning type by the prefix before the last
    /// delimiter.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPrefix`, listing every registered prefix, when
    /// nothing claims the id's prefix.
    pub fn resolve(&self, id: &str) -> Result<Registration> {
        let (prefix, _) = split_id(id, &self.delimiter);
        let entries = self.entries.read().expect("prefix registry lock poisoned");
        entries
            .get(prefix)
            .cloned()
            .ok_or_else(|| NeatIdError::UnknownPrefix {
                prefix: prefix.to_string(),
                known: sorted_keys(&entries),
            })
    }

    /// Type-agnostic lookup: resolve the owning type, then decode with its
    /// codec.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPrefix` when nothing claims the prefix, and
    /// `InvalidIdentifier` when the payload fails validation with
    /// `fallback` disabled.
    pub fn resolve_and_decode(&self, id: &str, fallback: bool) -> Result<Decoded> {
        let registration = self.resolve(id)?;
        registration
            .decode(id, fallback)
            .ok_or_else(|| NeatIdError::InvalidIdentifier { id: id.to_string() })
    }

    /// All registered prefixes, sorted.
    pub fn prefixes(&self) -> Vec<String> {
        let entries = self.entries.read().expect("prefix registry lock poisoned");
        sorted_keys(&entries)
    }

    pub fn contains(&self, prefix: &str) -> bool {
        let entries = self.entries.read().expect("prefix registry lock poisoned");
        entries.contains_key(prefix)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().expect("prefix registry lock poisoned");
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PrefixRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_keys(entries: &HashMap<String, Registration>) -> Vec<String> {
    let mut keys: Vec<String> = entries.keys().cloned().collect();
    keys.sort();
    keys
}
