//! Localized string tables keyed by dotted path.

use engine_logging::engine_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DE_TABLE: &str = include_str!("../locales/de.json");
const EN_TABLE: &str = include_str!("../locales/en.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    De,
    En,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("resource bundle is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("resource bundle root must be an object")]
    NotAnObject,
}

/// A nested string table. Leaves are strings, inner nodes are objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    root: Value,
}

impl Bundle {
    /// Loads one of the embedded tables. A broken embedded table degrades to an
    /// empty bundle, so every lookup falls back to its key.
    pub fn for_locale(locale: Locale) -> Self {
        let raw = match locale {
            Locale::De => DE_TABLE,
            Locale::En => EN_TABLE,
        };
        Self::from_json(raw).unwrap_or_else(|err| {
            engine_error!("Embedded bundle '{}' is unusable: {}", locale.tag(), err);
            Self::empty()
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, BundleError> {
        let root: Value = serde_json::from_str(raw)?;
        if !root.is_object() {
            return Err(BundleError::NotAnObject);
        }
        Ok(Self { root })
    }

    pub fn empty() -> Self {
        Self {
            root: Value::Object(serde_json::Map::new()),
        }
    }

    /// Resolves `key` segment by segment. A missing segment or a non-string
    /// leaf yields `fallback`, or the key itself when no fallback is given.
    pub fn lookup(&self, key: &str, fallback: Option<&str>) -> String {
        let mut node = &self.root;
        for segment in key.split('.') {
            match node.get(segment) {
                Some(next) => node = next,
                None => return fallback.unwrap_or(key).to_string(),
            }
        }
        match node.as_str() {
            Some(text) => text.to_string(),
            None => fallback.unwrap_or(key).to_string(),
        }
    }

    /// Lookup followed by interpolation.
    pub fn text(&self, key: &str, values: &[(&str, String)]) -> String {
        interpolate(&self.lookup(key, None), values)
    }
}

impl Default for Bundle {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

/// Replaces every `{name}` whose name appears in `values`. Placeholders with no
/// value, and braces that never close, are copied through untouched.
pub fn interpolate(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, close))
        });
        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn pluralize<'a>(count: i64, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}
