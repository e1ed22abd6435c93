// SPDX-License-Identifier: GPL-3.0-only

//! Setting declarations and stored preferences
//!
//! Declarations describe every setting the session knows about: its full
//! list of values, optional display labels and the default used when no
//! preference has been stored yet.

use super::SettingKey;
use crate::errors::{AppResult, DeclarationError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// One declared setting, before capability filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDeclaration {
    pub key: SettingKey,
    /// Human readable name
    #[serde(default)]
    pub title: Option<String>,
    /// Value used when nothing was stored
    pub default: String,
    /// Declared domain, in display order
    pub values: Vec<String>,
    /// Display entries parallel to `values`
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    /// Domain must be narrowed by the capability provider
    #[serde(default)]
    pub capability: bool,
}

impl SettingDeclaration {
    pub fn new<I, S>(key: &str, default: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: SettingKey::new(key),
            title: None,
            default: default.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            labels: None,
            capability: false,
        }
    }

    /// Mark the setting as hardware dependent
    pub fn with_capability(mut self) -> Self {
        self.capability = true;
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Label for `value`, falling back to the value itself
    pub fn label_for<'a>(&'a self, value: &'a str) -> &'a str {
        self.labels
            .as_ref()
            .and_then(|labels| {
                self.values
                    .iter()
                    .position(|v| v == value)
                    .and_then(|i| labels.get(i))
            })
            .map(String::as_str)
            .unwrap_or(value)
    }

    pub fn declares(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    fn validate(&self) -> Result<(), DeclarationError> {
        if self.values.is_empty() {
            return Err(DeclarationError::EmptyDomain(self.key.to_string()));
        }
        if !self.declares(&self.default) {
            return Err(DeclarationError::DefaultNotInDomain {
                key: self.key.to_string(),
                default: self.default.clone(),
            });
        }
        if let Some(labels) = &self.labels {
            if labels.len() != self.values.len() {
                return Err(DeclarationError::LabelMismatch {
                    key: self.key.to_string(),
                    values: self.values.len(),
                    labels: labels.len(),
                });
            }
        }
        Ok(())
    }
}

/// Check a set of declarations for internal consistency
pub fn validate_declarations(declarations: &[SettingDeclaration]) -> Result<(), DeclarationError> {
    let mut seen = HashSet::new();
    for declaration in declarations {
        if !seen.insert(declaration.key.as_str()) {
            return Err(DeclarationError::DuplicateKey(declaration.key.to_string()));
        }
        declaration.validate()?;
    }
    Ok(())
}

/// Parse and validate a JSON array of declarations
pub fn parse_declarations(json: &str) -> Result<Vec<SettingDeclaration>, DeclarationError> {
    let declarations: Vec<SettingDeclaration> =
        serde_json::from_str(json).map_err(|e| DeclarationError::Parse(e.to_string()))?;
    validate_declarations(&declarations)?;
    Ok(declarations)
}

/// Read declarations from a JSON file
pub fn load_declarations(path: &Path) -> AppResult<Vec<SettingDeclaration>> {
    let json = std::fs::read_to_string(path)?;
    let declarations = parse_declarations(&json)?;
    info!(path = %path.display(), count = declarations.len(), "Loaded setting declarations");
    Ok(declarations)
}

/// Source of the initial natural value of each setting
pub trait PreferenceSource {
    /// Value stored for `key`, if any
    fn stored_value(&self, key: &SettingKey) -> Option<String>;
}

impl PreferenceSource for HashMap<String, String> {
    fn stored_value(&self, key: &SettingKey) -> Option<String> {
        self.get(key.as_str()).cloned()
    }
}

/// No stored preferences; every setting starts at its default
impl PreferenceSource for () {
    fn stored_value(&self, _key: &SettingKey) -> Option<String> {
        None
    }
}

/// Preferences read from a flat JSON object of key/value strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredPreferences {
    values: HashMap<SettingKey, String>,
}

impl StoredPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read preferences from `path`; a missing file means nothing was stored
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No stored preferences");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(SettingKey::new(key), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceSource for StoredPreferences {
    fn stored_value(&self, key: &SettingKey) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let json = r#"[
            {"key": "flash_mode", "default": "auto", "values": ["auto", "on", "off"]},
            {"key": "iso", "default": "auto", "values": ["auto", "100", "800"],
             "labels": ["Auto", "ISO 100", "ISO 800"], "capability": true}
        ]"#;

        let declarations = parse_declarations(json).unwrap();
        assert_eq!(declarations.len(), 2);
        assert!(!declarations[0].capability);
        assert!(declarations[1].capability);
        assert_eq!(declarations[1].label_for("100"), "ISO 100");
        assert_eq!(declarations[0].label_for("on"), "on");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let declarations = vec![
            SettingDeclaration::new("iso", "auto", ["auto"]),
            SettingDeclaration::new("iso", "auto", ["auto", "100"]),
        ];
        assert_eq!(
            validate_declarations(&declarations),
            Err(DeclarationError::DuplicateKey("iso".to_string()))
        );
    }

    #[test]
    fn test_default_must_be_declared() {
        let declarations = vec![SettingDeclaration::new("iso", "200", ["auto", "100"])];
        assert!(matches!(
            validate_declarations(&declarations),
            Err(DeclarationError::DefaultNotInDomain { .. })
        ));
    }

    #[test]
    fn test_empty_domain_rejected() {
        let declarations = vec![SettingDeclaration::new("iso", "auto", Vec::<String>::new())];
        assert_eq!(
            validate_declarations(&declarations),
            Err(DeclarationError::EmptyDomain("iso".to_string()))
        );
    }

    #[test]
    fn test_label_count_must_match() {
        let declarations =
            vec![SettingDeclaration::new("iso", "auto", ["auto", "100"]).with_labels(["Auto"])];
        assert!(matches!(
            validate_declarations(&declarations),
            Err(DeclarationError::LabelMismatch {
                values: 2,
                labels: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_stored_preferences_from_json() {
        let prefs = StoredPreferences::from_json(r#"{"iso": "100"}"#).unwrap();
        assert_eq!(prefs.stored_value(&SettingKey::new("iso")), Some("100".to_string()));
        assert_eq!(prefs.stored_value(&SettingKey::new("flash_mode")), None);
    }
}
