// SPDX-License-Identifier: GPL-3.0-only

//! Natural values, overrides and back-dependencies
//!
//! Each setting keeps the value chosen by the user (its natural value) and,
//! while at least one driver forces it, an [`Override`]. The override owns
//! the list of drivers asserting it, so a setting is overridden exactly when
//! that list is non-empty: releasing the last driver drops the override.

use super::SettingKey;
use super::capability::FilteredDomain;
use std::collections::HashMap;

/// Forced value of a setting and the drivers asserting it
///
/// Drivers are kept in application order. The most recently applied driver
/// decides the effective value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    drivers: Vec<(SettingKey, String)>,
}

impl Override {
    fn new(driver: SettingKey, value: String) -> Self {
        Self {
            drivers: vec![(driver, value)],
        }
    }

    pub fn value(&self) -> &str {
        // Never empty: the last release drops the whole override
        self.drivers
            .last()
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    pub fn drivers(&self) -> impl Iterator<Item = &SettingKey> {
        self.drivers.iter().map(|(k, _)| k)
    }

    fn assert(&mut self, driver: SettingKey, value: String) {
        self.drivers.retain(|(k, _)| k != &driver);
        self.drivers.push((driver, value));
    }

    /// Returns true if the driver was present
    fn withdraw(&mut self, driver: &SettingKey) -> bool {
        let before = self.drivers.len();
        self.drivers.retain(|(k, _)| k != driver);
        self.drivers.len() != before
    }
}

/// A setting that survived capability filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub key: SettingKey,
    pub title: Option<String>,
    pub domain: FilteredDomain,
    natural: String,
    forced: Option<Override>,
}

impl Setting {
    /// Create a setting at `natural`, or at the domain's first value when
    /// `natural` is not legal
    pub fn new(
        key: SettingKey,
        title: Option<String>,
        domain: FilteredDomain,
        natural: &str,
    ) -> Self {
        let natural = domain.resolve(natural);
        Self {
            key,
            title,
            domain,
            natural,
            forced: None,
        }
    }

    pub fn natural_value(&self) -> &str {
        &self.natural
    }

    pub fn effective_value(&self) -> &str {
        match &self.forced {
            Some(forced) => forced.value(),
            None => &self.natural,
        }
    }

    pub fn is_overridden(&self) -> bool {
        self.forced.is_some()
    }

    pub fn drivers(&self) -> Vec<&SettingKey> {
        self.forced
            .as_ref()
            .map(|f| f.drivers().collect())
            .unwrap_or_default()
    }
}

/// Outcome of withdrawing one driver from a setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Released {
    /// Driver was not forcing the setting
    NotHeld,
    /// Other drivers remain and the effective value did not move
    Kept,
    /// Other drivers remain and the effective value became this one
    Changed(String),
    /// Last driver left; the natural value is effective again
    Cleared(String),
}

/// Per-key setting state in declaration order
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    settings: HashMap<SettingKey, Setting>,
    order: Vec<SettingKey>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, setting: Setting) {
        if !self.settings.contains_key(&setting.key) {
            self.order.push(setting.key.clone());
        }
        self.settings.insert(setting.key.clone(), setting);
    }

    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.settings.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.settings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Settings in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.order.iter().filter_map(|k| self.settings.get(k))
    }

    pub fn effective_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(Setting::effective_value)
    }

    pub fn natural_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(Setting::natural_value)
    }

    /// Store a new natural value; the caller has checked the domain
    pub fn set_natural(&mut self, key: &SettingKey, value: &str) {
        if let Some(setting) = self.settings.get_mut(key) {
            setting.natural = value.to_string();
        }
    }

    /// Make `driver` force `value` on `key`
    ///
    /// The latest driver wins when several force different values. Returns
    /// the new effective value, or `None` if `key` is unknown.
    pub fn apply_override(
        &mut self,
        key: &SettingKey,
        value: &str,
        driver: &SettingKey,
    ) -> Option<&str> {
        let setting = self.settings.get_mut(key)?;
        match &mut setting.forced {
            Some(forced) => forced.assert(driver.clone(), value.to_string()),
            None => setting.forced = Some(Override::new(driver.clone(), value.to_string())),
        }
        Some(setting.effective_value())
    }

    /// Withdraw `driver` from the drivers forcing `key`
    pub fn release_override(&mut self, key: &SettingKey, driver: &SettingKey) -> Released {
        let Some(setting) = self.settings.get_mut(key) else {
            return Released::NotHeld;
        };
        let Some(forced) = setting.forced.as_mut() else {
            return Released::NotHeld;
        };

        let before = forced.value().to_string();
        if !forced.withdraw(driver) {
            return Released::NotHeld;
        }

        if forced.drivers.is_empty() {
            setting.forced = None;
            return Released::Cleared(setting.natural.clone());
        }

        let after = forced.value();
        if after == before {
            Released::Kept
        } else {
            Released::Changed(after.to_string())
        }
    }
}
