#![forbid(unsafe_code)]

//! Settings resolution: defaults, user options, `data-*` overrides.
//!
//! Every widget has a settings struct deriving `Serialize`/`Deserialize`
//! with `#[serde(default, rename_all = "camelCase")]`. Resolution is a
//! shallow merge over the serialized defaults:
//!
//! 1. `S::default()`
//! 2. user options (JSON object or TOML section), key by key
//! 3. per-element `data-*` attributes whose camelCased name matches a key
//!
//! Step 3 happens per trigger at event time and never fails: an attribute
//! that does not parse for its field is logged and that field keeps its
//! instance value.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use trellis_core::dom::{Document, ElementId};
use trellis_core::selector::Selector;

use crate::config::ConfigError;

/// User options: a JSON object keyed by camelCase setting names.
pub type Options = Map<String, Value>;

pub trait Settings: Default + Clone + Serialize + DeserializeOwned {
    /// Widget name, also the config-file section.
    const NAME: &'static str;

    /// Defaults overridden by `options`.
    fn from_options(options: &Options) -> Result<Self, ConfigError> {
        Self::default().merged(options)
    }

    /// `self` overridden by `options`.
    fn merged(&self, options: &Options) -> Result<Self, ConfigError> {
        let mut value = serde_json::to_value(self).map_err(|source| ConfigError::InvalidOption {
            widget: Self::NAME,
            source,
        })?;
        if let Value::Object(map) = &mut value {
            for (key, v) in options {
                map.insert(key.clone(), v.clone());
            }
        }
        serde_json::from_value(value).map_err(|source| ConfigError::InvalidOption {
            widget: Self::NAME,
            source,
        })
    }

    /// `self` overridden by matching `data-*` attributes of `el`. Each
    /// attribute is applied on its own; one that does not parse is skipped.
    fn with_data_overrides(&self, doc: &Document, el: ElementId) -> Self {
        let Ok(Value::Object(base)) = serde_json::to_value(self) else {
            return self.clone();
        };
        let mut resolved = self.clone();
        for (key, raw) in doc.dataset(el) {
            let Some(current) = base.get(&key) else {
                continue;
            };
            let mut single = Options::new();
            single.insert(key.clone(), coerce(current, &raw));
            match resolved.merged(&single) {
                Ok(s) => resolved = s,
                Err(err) => tracing::warn!(
                    widget = Self::NAME,
                    element = %el,
                    key = %key,
                    error = %err,
                    "ignoring data-* override"
                ),
            }
        }
        resolved
    }
}

/// Interpret an attribute string according to the type of the setting it
/// overrides.
fn coerce(current: &Value, raw: &str) -> Value {
    match current {
        Value::String(_) => Value::String(raw.to_owned()),
        Value::Bool(_) => match raw.trim() {
            "true" | "" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_owned()),
        },
        _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned())),
    }
}

/// Parse a selector setting.
pub fn selector(source: &str) -> Result<Selector, ConfigError> {
    Ok(Selector::parse(source)?)
}
