use serde::{Deserialize, Serialize};

use super::constants::{ConfigDocument, Constants};
use crate::error::TenderCalcError;
use crate::TenderCalcResult;

/// Default configuration shipped with the package.
pub const PACKAGED_DEFAULTS: &str = include_str!("../../config/defaults.json");

/// Which layer supplied the highest-priority usable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigLayer {
    User,
    Packaged,
    Fallback,
}

/// Constants plus a report of how they were resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedConstants {
    pub constants: Constants,
    pub source: ConfigLayer,
    /// Layers that contributed leaves, highest priority first.
    pub layers_applied: Vec<ConfigLayer>,
    pub warnings: Vec<String>,
}

/// Layered configuration source: user override, then packaged default, then
/// the hard-coded fallback. Merging is per leaf.
///
/// The resolver never touches the filesystem; callers hand it text.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    user: Option<String>,
    packaged: Option<String>,
    allow_fallback: bool,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    /// Resolver with no user override and the embedded packaged default.
    pub fn new() -> Self {
        Self {
            user: None,
            packaged: Some(PACKAGED_DEFAULTS.to_string()),
            allow_fallback: true,
        }
    }

    /// User-edited configuration blob (JSON).
    pub fn with_user_config(mut self, text: impl Into<String>) -> Self {
        self.user = Some(text.into());
        self
    }

    /// Replace the embedded packaged default with externally loaded text.
    pub fn with_packaged(mut self, text: impl Into<String>) -> Self {
        self.packaged = Some(text.into());
        self
    }

    /// Mark the packaged default as unreachable.
    pub fn without_packaged(mut self) -> Self {
        self.packaged = None;
        self
    }

    /// Refuse to run on hard-coded values alone.
    pub fn without_fallback(mut self) -> Self {
        self.allow_fallback = false;
        self
    }

    pub fn resolve(&self) -> TenderCalcResult<ResolvedConstants> {
        let mut warnings: Vec<String> = Vec::new();
        let mut layers: Vec<(ConfigLayer, ConfigDocument)> = Vec::new();

        if let Some(doc) = parse_layer(ConfigLayer::User, self.user.as_deref(), &mut warnings) {
            layers.push((ConfigLayer::User, doc));
        }
        match self.packaged.as_deref() {
            Some(text) => {
                if let Some(doc) = parse_layer(ConfigLayer::Packaged, Some(text), &mut warnings) {
                    layers.push((ConfigLayer::Packaged, doc));
                }
            }
            None => {
                tracing::warn!("packaged default configuration is unreachable");
                warnings.push("Packaged default configuration is unreachable".into());
            }
        }

        if layers.is_empty() && !self.allow_fallback {
            return Err(TenderCalcError::ConfigUnavailable(
                "no usable user or packaged configuration and fallback is disabled".into(),
            ));
        }

        let source = layers
            .first()
            .map(|(layer, _)| *layer)
            .unwrap_or(ConfigLayer::Fallback);
        let mut layers_applied: Vec<ConfigLayer> = layers.iter().map(|(l, _)| *l).collect();
        layers_applied.push(ConfigLayer::Fallback);

        let merged = layers
            .into_iter()
            .map(|(_, doc)| doc)
            .reduce(|upper, lower| upper.overlay(lower))
            .unwrap_or_default();

        if source == ConfigLayer::Fallback {
            tracing::warn!("using hard-coded fallback constants");
        } else {
            tracing::debug!(?source, "configuration resolved");
        }

        Ok(ResolvedConstants {
            constants: Constants::from_document(&merged),
            source,
            layers_applied,
            warnings,
        })
    }
}

fn parse_layer(
    layer: ConfigLayer,
    text: Option<&str>,
    warnings: &mut Vec<String>,
) -> Option<ConfigDocument> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<ConfigDocument>(text) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(?layer, error = %e, "ignoring malformed configuration layer");
            warnings.push(format!("Ignored malformed {layer:?} configuration: {e}"));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
