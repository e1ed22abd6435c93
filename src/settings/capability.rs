// SPDX-License-Identifier: GPL-3.0-only

//! Hardware capability filtering
//!
//! A setting declared with `capability: true` only keeps the values the
//! current camera reports as supported. Settings left with no value at all
//! are removed from the session.

use super::SettingKey;
use super::declaration::SettingDeclaration;
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Reports which values of a setting the active camera supports
///
/// Queried once per setting while the session is built.
pub trait CapabilityProvider {
    /// Supported values for `key`, or `None` when the camera has no support
    fn supported_values(&self, key: &SettingKey) -> Option<Vec<String>>;
}

/// Capabilities given up front, e.g. read from a device profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCapabilities {
    supported: HashMap<SettingKey, Vec<String>>,
}

impl StaticCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported.insert(
            SettingKey::new(key),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let capabilities = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            settings = capabilities.supported.len(),
            "Loaded camera capabilities"
        );
        Ok(capabilities)
    }
}

impl CapabilityProvider for StaticCapabilities {
    fn supported_values(&self, key: &SettingKey) -> Option<Vec<String>> {
        self.supported.get(key).cloned()
    }
}

/// Domain of a setting after filtering, with labels kept in step
///
/// Never empty: a setting without supported values is removed instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredDomain {
    values: Vec<String>,
    labels: Vec<String>,
}

impl FilteredDomain {
    /// `None` when `values` is empty or `labels` is not parallel to it
    pub(crate) fn new(values: Vec<String>, labels: Vec<String>) -> Option<Self> {
        if values.is_empty() || values.len() != labels.len() {
            return None;
        }
        Some(Self { values, labels })
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    /// `candidate` if it is legal, otherwise the first value of the domain
    pub fn resolve(&self, candidate: &str) -> String {
        match self.values.first() {
            Some(first) if !self.contains(candidate) => first.clone(),
            _ => candidate.to_string(),
        }
    }
}

/// Keep the declared values that appear in `supported`, in declared order
pub fn filter_values(declared: &[String], supported: &[String]) -> Vec<String> {
    declared
        .iter()
        .filter(|v| supported.contains(v))
        .cloned()
        .collect()
}

/// Narrow a declaration to what the provider supports
///
/// Returns `None` when nothing is left and the setting must be removed.
pub fn filter_declaration(
    declaration: &SettingDeclaration,
    provider: &dyn CapabilityProvider,
) -> Option<FilteredDomain> {
    let values = if declaration.capability {
        let Some(supported) = provider.supported_values(&declaration.key) else {
            warn!(key = %declaration.key, "No capability reported, removing setting");
            return None;
        };
        filter_values(&declaration.values, &supported)
    } else {
        declaration.values.clone()
    };

    if values.is_empty() {
        warn!(key = %declaration.key, "No supported values, removing setting");
        return None;
    }

    if values.len() < declaration.values.len() {
        debug!(
            key = %declaration.key,
            declared = declaration.values.len(),
            supported = values.len(),
            "Filtered unsupported values"
        );
    }

    let labels = values
        .iter()
        .map(|v| declaration.label_for(v).to_string())
        .collect();

    FilteredDomain::new(values, labels)
}
