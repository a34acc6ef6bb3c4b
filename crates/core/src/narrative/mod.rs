//! Narrative Formatter
//!
//! Maps aggregate metrics to a fixed vocabulary of classification keys. Final
//! sentences are produced elsewhere by a [`Translate`] implementation, so this
//! module never depends on a language or locale.

mod formatter;

pub use formatter::{
    ConversionTrend, LossStatus, NarrativeFormatter, NarrativeSummary, PipelineStrength,
    VolumeStatus,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Renders a message key plus parameters into display text.
pub trait Translate {
    fn translate(&self, key: &str, params: &BTreeMap<String, String>) -> String;
}

/// A classification key and the parameters its sentence needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeMessage {
    pub key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl NarrativeMessage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), params: BTreeMap::new() }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn render(&self, translator: &dyn Translate) -> String {
        translator.translate(&self.key, &self.params)
    }
}

/// Translator that echoes the key and its parameters; used when no catalog is wired.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyEchoTranslator;

impl Translate for KeyEchoTranslator {
    fn translate(&self, key: &str, params: &BTreeMap<String, String>) -> String {
        if params.is_empty() {
            return key.to_string();
        }
        let rendered: Vec<String> =
            params.iter().map(|(name, value)| format!("{name}={value}")).collect();
        format!("{key}({})", rendered.join(", "))
    }
}
