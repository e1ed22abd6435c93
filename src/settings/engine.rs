// SPDX-License-Identifier: GPL-3.0-only

//! Settings dependency engine
//!
//! The engine owns every setting of a camera session. Changing a setting
//! re-evaluates the rules keyed on it: overrides asserted by its previous
//! value are released, overrides asserted by its new value are applied, and
//! the resulting changes are returned (and delivered to listeners) as one
//! ordered [`ChangeBatch`]:
//!
//! 1. the changed setting itself
//! 2. settings whose override was released
//! 3. settings whose override was applied
//!
//! Consumers rely on this order: the driver's new value is visible before
//! any dependent change is observed.

use super::capability::{CapabilityProvider, filter_declaration};
use super::declaration::{PreferenceSource, SettingDeclaration, validate_declarations};
use super::listener::{FollowUps, ListenerId, SettingsListener};
use super::rules::{RuleMap, RuleTable};
use super::store::{Released, Setting, ValueStore};
use super::{ChangeBatch, SettingKey};
use crate::errors::{DeclarationError, SettingsError};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Upper bound on follow-up changes processed after one `set_value`
const MAX_FOLLOW_UPS: usize = 64;

/// Read-only view of one setting, e.g. for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingSnapshot {
    pub key: SettingKey,
    pub title: Option<String>,
    /// Effective value
    pub value: String,
    pub natural: String,
    /// Drivers forcing the setting, most recent last
    pub forced_by: Vec<SettingKey>,
    pub values: Vec<String>,
    pub labels: Vec<String>,
}

impl From<&Setting> for SettingSnapshot {
    fn from(setting: &Setting) -> Self {
        Self {
            key: setting.key.clone(),
            title: setting.title.clone(),
            value: setting.effective_value().to_string(),
            natural: setting.natural_value().to_string(),
            forced_by: setting.drivers().into_iter().cloned().collect(),
            values: setting.domain.values().to_vec(),
            labels: setting.domain.labels().to_vec(),
        }
    }
}

/// Owns the settings of one camera session
pub struct SettingsEngine {
    store: ValueStore,
    rules: RuleTable,
    unavailable: Vec<SettingKey>,
    listeners: Vec<(ListenerId, Box<dyn SettingsListener>)>,
    next_listener: u64,
}

impl SettingsEngine {
    /// Build the session's settings
    ///
    /// Each declaration is narrowed by `capabilities`; settings left without
    /// values are dropped and listed by [`Self::unavailable`]. Initial values
    /// come from `preferences`, then the declared default, then the first
    /// supported value. Rules for every initial value are applied before the
    /// engine is returned.
    pub fn new(
        declarations: &[SettingDeclaration],
        rules: RuleTable,
        capabilities: &dyn CapabilityProvider,
        preferences: &dyn PreferenceSource,
    ) -> Result<Self, DeclarationError> {
        validate_declarations(declarations)?;

        let mut store = ValueStore::new();
        let mut unavailable = Vec::new();

        for declaration in declarations {
            let Some(domain) = filter_declaration(declaration, capabilities) else {
                unavailable.push(declaration.key.clone());
                continue;
            };

            let candidate = preferences
                .stored_value(&declaration.key)
                .unwrap_or_else(|| declaration.default.clone());
            let setting = Setting::new(
                declaration.key.clone(),
                declaration.title.clone(),
                domain,
                &candidate,
            );
            if setting.natural_value() != candidate {
                debug!(
                    key = %declaration.key,
                    stored = %candidate,
                    value = %setting.natural_value(),
                    "Initial value not supported, using first supported value"
                );
            }
            store.insert(setting);
        }

        let mut engine = Self {
            store,
            rules,
            unavailable,
            listeners: Vec::new(),
            next_listener: 0,
        };
        engine.apply_initial_rules();

        info!(
            settings = engine.store.len(),
            unavailable = engine.unavailable.len(),
            "Settings engine ready"
        );
        Ok(engine)
    }

    fn apply_initial_rules(&mut self) {
        let drivers: Vec<(SettingKey, String)> = self
            .store
            .iter()
            .filter(|s| self.rules.is_driver(&s.key))
            .map(|s| (s.key.clone(), s.natural_value().to_string()))
            .collect();

        for (driver, value) in drivers {
            let Some(map) = self.rules.lookup(&driver, &value).cloned() else {
                continue;
            };
            for (dependent, forced) in map.iter() {
                apply_forced(&mut self.store, dependent, forced, &driver);
            }
        }
    }

    // ===== Mutation =====

    /// Set the natural value of `key`
    ///
    /// Returns the ordered changes, empty when `value` already is the natural
    /// value. Rejected calls leave every setting untouched.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<ChangeBatch, SettingsError> {
        let batch = self.apply(key, value)?;
        if !batch.is_empty() {
            self.dispatch(&batch);
        }
        Ok(batch)
    }

    /// Set `key` to the value at `index` of its supported values
    pub fn set_value_index(
        &mut self,
        key: &str,
        index: usize,
    ) -> Result<ChangeBatch, SettingsError> {
        let setting = self
            .store
            .get(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
        let value = setting
            .domain
            .values()
            .get(index)
            .cloned()
            .ok_or_else(|| SettingsError::IndexOutOfRange {
                key: key.to_string(),
                index,
            })?;
        self.set_value(key, &value)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<ChangeBatch, SettingsError> {
        let setting = self
            .store
            .get(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;

        if !setting.domain.contains(value) {
            return Err(SettingsError::ValueNotInDomain {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        if setting.natural_value() == value {
            debug!(key, value, "Setting unchanged");
            return Ok(ChangeBatch::new());
        }

        if setting.is_overridden() {
            return Err(SettingsError::Overridden {
                key: key.to_string(),
                drivers: setting.drivers().iter().map(|d| d.to_string()).collect(),
            });
        }

        let driver = setting.key.clone();
        let previous = setting.natural_value().to_string();
        let old_rules = self.rules.lookup(&driver, &previous).cloned().unwrap_or_default();
        let new_rules = self.rules.lookup(&driver, value).cloned().unwrap_or_default();

        debug!(key, from = %previous, to = value, "Setting value");

        let mut batch = ChangeBatch::new();
        self.store.set_natural(&driver, value);
        batch.push(&driver, value);

        if old_rules == new_rules {
            return Ok(batch);
        }

        self.release_rules(&driver, &old_rules, &new_rules, &mut batch);

        for (dependent, forced) in new_rules.iter() {
            if old_rules.get(dependent) == Some(forced) {
                continue;
            }
            if let Some(effective) = apply_forced(&mut self.store, dependent, forced, &driver) {
                batch.push(dependent, &effective);
            }
        }

        Ok(batch)
    }

    fn release_rules(
        &mut self,
        driver: &SettingKey,
        old_rules: &RuleMap,
        new_rules: &RuleMap,
        batch: &mut ChangeBatch,
    ) {
        for (dependent, _) in old_rules.iter() {
            // Still forced with a usable value: handled as a re-apply
            if new_rules
                .get(dependent)
                .is_some_and(|forced| can_force(&self.store, dependent, forced))
            {
                continue;
            }
            match self.store.release_override(dependent, driver) {
                Released::Cleared(value) => {
                    debug!(key = %dependent, %driver, value = %value, "Override cleared");
                    batch.push(dependent, &value);
                }
                Released::Changed(value) => {
                    debug!(key = %dependent, %driver, value = %value, "Override handed to earlier driver");
                    batch.push(dependent, &value);
                }
                Released::Kept | Released::NotHeld => {}
            }
        }
    }

    fn dispatch(&mut self, batch: &ChangeBatch) {
        let mut follow_ups = FollowUps::new();
        self.deliver(batch, &mut follow_ups);

        let mut processed = 0;
        while let Some((key, value)) = follow_ups.pop() {
            if processed == MAX_FOLLOW_UPS {
                warn!(
                    dropped = follow_ups.len() + 1,
                    "Too many follow-up changes, dropping the rest"
                );
                break;
            }
            processed += 1;

            match self.apply(key.as_str(), &value) {
                Ok(next) if next.is_empty() => {}
                Ok(next) => self.deliver(&next, &mut follow_ups),
                Err(err) => warn!(key = %key, value = %value, %err, "Follow-up change rejected"),
            }
        }
    }

    fn deliver(&mut self, batch: &ChangeBatch, follow_ups: &mut FollowUps) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_settings_changed(batch, follow_ups);
        }
    }

    // ===== Listeners =====

    pub fn add_listener(&mut self, listener: Box<dyn SettingsListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if the listener was already removed
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    // ===== Queries =====

    /// Effective value: the forced value while overridden, else the natural one
    pub fn value(&self, key: &str) -> Option<&str> {
        self.store.effective_value(key)
    }

    pub fn natural_value(&self, key: &str) -> Option<&str> {
        self.store.natural_value(key)
    }

    /// Supported values, in declared order
    pub fn domain(&self, key: &str) -> Option<&[String]> {
        self.store.get(key).map(|s| s.domain.values())
    }

    /// Display labels parallel to [`Self::domain`]
    pub fn labels(&self, key: &str) -> Option<&[String]> {
        self.store.get(key).map(|s| s.domain.labels())
    }

    /// Index of the effective value within [`Self::domain`]
    pub fn value_index(&self, key: &str) -> Option<usize> {
        let setting = self.store.get(key)?;
        setting.domain.position(setting.effective_value())
    }

    pub fn is_overridden(&self, key: &str) -> bool {
        self.store.get(key).is_some_and(Setting::is_overridden)
    }

    /// Drivers currently forcing `key`, most recent last
    pub fn overriding_drivers(&self, key: &str) -> Vec<&SettingKey> {
        self.store
            .get(key)
            .map(Setting::drivers)
            .unwrap_or_default()
    }

    pub fn is_available(&self, key: &str) -> bool {
        self.store.contains(key)
    }

    /// Settings removed because the camera supports none of their values
    pub fn unavailable(&self) -> &[SettingKey] {
        &self.unavailable
    }

    /// Available keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &SettingKey> {
        self.store.iter().map(|s| &s.key)
    }

    pub fn snapshot(&self, key: &str) -> Option<SettingSnapshot> {
        self.store.get(key).map(SettingSnapshot::from)
    }

    /// Every available setting in declaration order
    pub fn snapshots(&self) -> Vec<SettingSnapshot> {
        self.store.iter().map(SettingSnapshot::from).collect()
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }
}

/// `dependent` is available and supports `value`
fn can_force(store: &ValueStore, dependent: &SettingKey, value: &str) -> bool {
    store
        .get(dependent.as_str())
        .is_some_and(|setting| setting.domain.contains(value))
}

/// Force `dependent` to `value` on behalf of `driver`
///
/// Targets removed by the capability filter, and values the camera does not
/// support, are skipped. Returns the dependent's new effective value.
fn apply_forced(
    store: &mut ValueStore,
    dependent: &SettingKey,
    value: &str,
    driver: &SettingKey,
) -> Option<String> {
    let Some(setting) = store.get(dependent.as_str()) else {
        debug!(key = %dependent, %driver, "Rule target unavailable, skipping");
        return None;
    };
    if !setting.domain.contains(value) {
        warn!(key = %dependent, %driver, value, "Forced value not supported, skipping");
        return None;
    }
    store
        .apply_override(dependent, value, driver)
        .map(str::to_string)
}
