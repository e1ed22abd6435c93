// SPDX-License-Identifier: GPL-3.0-only

//! Camera settings with declarative dependencies
//!
//! Settings are declared once per session ([`declaration`]), narrowed to what
//! the hardware supports ([`capability`]) and then driven through the
//! [`SettingsEngine`]. Rules loaded into a [`RuleTable`] force dependent
//! settings to fixed values while a driver holds a given value; the engine
//! tracks which drivers force which keys and reports every change as an
//! ordered [`ChangeBatch`].

pub mod capability;
pub mod declaration;
pub mod engine;
pub mod listener;
pub mod rules;
pub mod store;

pub use capability::{CapabilityProvider, StaticCapabilities};
pub use declaration::{PreferenceSource, SettingDeclaration, StoredPreferences};
pub use engine::{SettingSnapshot, SettingsEngine};
pub use listener::{FollowUps, ListenerId, SettingsListener};
pub use rules::{RuleMap, RuleTable};

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier of a setting
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingKey(String);

impl SettingKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SettingKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SettingKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for SettingKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A setting whose effective value changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub key: SettingKey,
    /// New effective value
    pub value: String,
}

impl ChangeEvent {
    pub fn new(key: impl Into<SettingKey>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Ordered changes produced by one `set_value` call
///
/// The driver's own change always comes first, followed by released
/// overrides, then newly applied ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeBatch(Vec<ChangeEvent>);

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: &SettingKey, value: &str) {
        self.0.push(ChangeEvent::new(key.clone(), value));
    }

    pub fn events(&self) -> &[ChangeEvent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEvent> {
        self.0.iter()
    }

    /// Latest value reported for `key` in this batch
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|e| e.key.as_str() == key)
            .map(|e| e.value.as_str())
    }

    pub fn into_events(self) -> Vec<ChangeEvent> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ChangeBatch {
    type Item = &'a ChangeEvent;
    type IntoIter = std::slice::Iter<'a, ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ChangeBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
