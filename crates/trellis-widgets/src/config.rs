#![forbid(unsafe_code)]

//! Widget configuration files.
//!
//! A config file is a TOML document with one table per widget type:
//!
//! ```toml
//! [accordion]
//! open_multiple_items = true
//!
//! [tooltip]
//! position = "bottom"
//! delayIn = 150
//! ```
//!
//! Keys may be written in `snake_case` or in the `camelCase` used by JSON
//! options; both map to the same setting.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use trellis_core::selector::SelectorError;

use crate::settings::{Options, Settings};

/// Section names accepted in a config file.
pub const WIDGET_SECTIONS: &[&str] = &[
    "accordion",
    "card",
    "chip",
    "dialog",
    "dropdown",
    "modal",
    "panel",
    "password-reveal",
    "popover",
    "remover",
    "smooth-scroll",
    "toast",
    "toggler",
    "tooltip",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("options must be a JSON object: {0}")]
    Json(#[source] serde_json::Error),
    #[error("invalid {widget} option: {source}")]
    InvalidOption {
        widget: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown widget section [{0}]")]
    UnknownWidget(String),
    #[error("section [{0}] must be a table")]
    NotATable(String),
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Per-widget option tables loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    sections: BTreeMap<String, Options>,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = input.parse()?;
        let mut sections = BTreeMap::new();
        for (name, value) in table {
            if !WIDGET_SECTIONS.contains(&name.as_str()) {
                return Err(ConfigError::UnknownWidget(name));
            }
            let toml::Value::Table(section) = value else {
                return Err(ConfigError::NotATable(name));
            };
            let mut options = Options::new();
            for (key, value) in section {
                let json = serde_json::to_value(&value).map_err(ConfigError::Json)?;
                options.insert(camel_case(&key), json);
            }
            tracing::debug!(section = %name, keys = options.len(), "config section loaded");
            sections.insert(name, options);
        }
        Ok(Self { sections })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Raw options of one section.
    pub fn options(&self, widget: &str) -> Option<&Options> {
        self.sections.get(widget)
    }

    /// Settings for `S`: defaults overridden by its section, if present.
    pub fn settings<S: Settings>(&self) -> Result<S, ConfigError> {
        match self.sections.get(S::NAME) {
            Some(options) => S::from_options(options),
            None => Ok(S::default()),
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a JSON options object.
pub fn parse_options(json: &str) -> Result<Options, ConfigError> {
    match serde_json::from_str::<Value>(json).map_err(ConfigError::Json)? {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::Json(serde::de::Error::custom(format!(
            "expected object, found {other}"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accordion::AccordionSettings;
    use crate::tooltip::{TooltipSettings, TooltipTrigger};
    use std::io::Write;
    use trellis_core::geometry::Side;

    #[test]
    fn snake_and_camel_keys_both_apply() {
        let config = Config::from_toml_str(
            "[accordion]\nopen_multiple_items = true\n\n[tooltip]\ndelayIn = 150\nposition = \"bottom\"\ntrigger = \"click\"\n",
        )
        .expect("valid config");
        let acc: AccordionSettings = config.settings().expect("accordion");
        assert!(acc.open_multiple_items);
        let tip: TooltipSettings = config.settings().expect("tooltip");
        assert_eq!(tip.delay_in, 150);
        assert_eq!(tip.position, Side::Bottom);
        assert_eq!(tip.trigger, TooltipTrigger::Click);
    }

    #[test]
    fn missing_section_yields_defaults() {
        let config = Config::from_toml_str("").expect("empty config");
        let acc: AccordionSettings = config.settings().expect("defaults");
        assert_eq!(acc, AccordionSettings::default());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = Config::from_toml_str("[carousel]\nx = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownWidget(ref s) if s == "carousel"));
    }

    #[test]
    fn wrong_type_reports_widget() {
        let config = Config::from_toml_str("[accordion]\nanimation = \"yes\"\n").expect("toml");
        let err = config.settings::<AccordionSettings>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { widget: "accordion", .. }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml_str("[accordion"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[toast]\nmax_toasts = 2").expect("write");
        let config = Config::load(file.path()).expect("load");
        assert_eq!(
            config.options("toast").and_then(|o| o.get("maxToasts")),
            Some(&Value::from(2))
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn parse_options_requires_object() {
        assert!(parse_options("{\"animation\": false}").is_ok());
        assert!(matches!(parse_options("[1]"), Err(ConfigError::Json(_))));
    }
}
