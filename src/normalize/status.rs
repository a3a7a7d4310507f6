//! Status vocabulary: translates carrier status tokens into [`NormalizedStatus`].
//!
//! Keys are compared after upper-casing and collapsing whitespace runs into a
//! single underscore, so `"en transito"`, `"EN  TRANSITO"` and `"En_Transito"`
//! all resolve to the same entry.
//!
//! Known limitation: a token that is already a canonical English code, such as
//! `"IN_TRANSIT"`, is not in the table and translates to `UNKNOWN`. Add an
//! explicit entry (for instance through the `[vocabulary]` config section) to
//! recognize it.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::NormalizedStatus;

/// Built-in table entries
pub const DEFAULT_ENTRIES: &[(&str, NormalizedStatus)] = &[
    ("EN_ALMACEN", NormalizedStatus::AtWarehouse),
    ("EN_TRANSITO", NormalizedStatus::InTransit),
    (
        "INTENTO_DE_ENTREGA_FALLIDO",
        NormalizedStatus::DeliveryAttemptFailed,
    ),
    ("ENTREGADO", NormalizedStatus::Delivered),
];

static DEFAULT_VOCABULARY: Lazy<StatusVocabulary> = Lazy::new(StatusVocabulary::new);

/// Translate with the built-in table
pub fn translate(raw_status: &str) -> NormalizedStatus {
    DEFAULT_VOCABULARY.translate(raw_status)
}

#[derive(Debug, Clone)]
pub struct StatusVocabulary {
    table: HashMap<String, NormalizedStatus>,
}

impl StatusVocabulary {
    /// Vocabulary holding the built-in entries
    pub fn new() -> Self {
        Self::with_entries(std::iter::empty::<(String, NormalizedStatus)>())
    }

    /// Built-in entries plus `extra`; extra keys are normalized the same way
    /// lookups are and override built-ins on collision
    pub fn with_entries<I, K>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, NormalizedStatus)>,
        K: AsRef<str>,
    {
        let mut vocabulary = Self {
            table: HashMap::new(),
        };
        for (token, status) in DEFAULT_ENTRIES {
            vocabulary.insert(token, *status);
        }
        for (token, status) in extra {
            vocabulary.insert(token.as_ref(), status);
        }
        vocabulary
    }

    pub fn insert(&mut self, token: &str, status: NormalizedStatus) {
        self.table.insert(Self::normalize_key(token), status);
    }

    /// Upper-case, trim, and join whitespace-separated words with `_`
    pub fn normalize_key(raw_status: &str) -> String {
        raw_status
            .split_whitespace()
            .map(|word| word.to_uppercase())
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Never fails: anything not in the table is `Unknown`
    pub fn translate(&self, raw_status: &str) -> NormalizedStatus {
        self.table
            .get(&Self::normalize_key(raw_status))
            .copied()
            .unwrap_or(NormalizedStatus::Unknown)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::new()
    }
}
