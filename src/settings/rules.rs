// SPDX-License-Identifier: GPL-3.0-only

//! Setting dependency rules
//!
//! Rules are read from a JSON document of the form
//!
//! ```json
//! {
//!   "scene_mode": {
//!     "hdr":     { "flash_mode": "off", "burst_mode": "off" },
//!     "default": { }
//!   }
//! }
//! ```
//!
//! While `scene_mode` holds `hdr`, `flash_mode` and `burst_mode` are forced
//! to `off`. The `default` entry applies to every value without an entry of
//! its own. Tables are validated against the declarations when loaded and
//! never change afterwards.

use super::SettingKey;
use super::declaration::SettingDeclaration;
use crate::constants::DEFAULT_RULE_VALUE;
use crate::errors::{AppResult, RuleError};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

type RawRules = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// Dependent settings forced by one driver value, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleMap {
    forced: Vec<(SettingKey, String)>,
}

impl RuleMap {
    pub fn get(&self, key: &SettingKey) -> Option<&str> {
        self.forced
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SettingKey, &str)> {
        self.forced.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.forced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forced.is_empty()
    }
}

impl FromIterator<(SettingKey, String)> for RuleMap {
    fn from_iter<T: IntoIterator<Item = (SettingKey, String)>>(iter: T) -> Self {
        let sorted: BTreeMap<SettingKey, String> = iter.into_iter().collect();
        Self {
            forced: sorted.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct DriverRules {
    by_value: BTreeMap<String, RuleMap>,
    fallback: Option<RuleMap>,
}

/// Immutable table of dependency rules
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    drivers: HashMap<SettingKey, DriverRules>,
}

impl RuleTable {
    /// Table without any rule
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `json` and validate it against `declarations`
    pub fn from_json(json: &str, declarations: &[SettingDeclaration]) -> Result<Self, RuleError> {
        let raw: RawRules =
            serde_json::from_str(json).map_err(|e| RuleError::Parse(e.to_string()))?;
        Self::from_raw(raw, declarations)
    }

    /// Read and validate a rule file
    pub fn load(path: &Path, declarations: &[SettingDeclaration]) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json, declarations)?;
        info!(
            path = %path.display(),
            drivers = table.drivers.len(),
            "Loaded setting dependency rules"
        );
        Ok(table)
    }

    fn from_raw(raw: RawRules, declarations: &[SettingDeclaration]) -> Result<Self, RuleError> {
        let declared: HashMap<&str, &SettingDeclaration> = declarations
            .iter()
            .map(|d| (d.key.as_str(), d))
            .collect();

        let mut drivers = HashMap::new();
        for (driver, entries) in raw {
            let driver_decl = declared
                .get(driver.as_str())
                .ok_or_else(|| RuleError::UnknownDriver(driver.clone()))?;

            let mut rules = DriverRules::default();
            for (value, forced) in entries {
                if value != DEFAULT_RULE_VALUE && !driver_decl.declares(&value) {
                    return Err(RuleError::UnknownDriverValue {
                        driver: driver.clone(),
                        value,
                    });
                }

                for (dependent, forced_value) in &forced {
                    if dependent == &driver {
                        return Err(RuleError::SelfDependency(driver.clone()));
                    }
                    let dependent_decl = declared.get(dependent.as_str()).ok_or_else(|| {
                        RuleError::UnknownDependent {
                            driver: driver.clone(),
                            dependent: dependent.clone(),
                        }
                    })?;
                    if !dependent_decl.declares(forced_value) {
                        return Err(RuleError::UnknownForcedValue {
                            driver: driver.clone(),
                            dependent: dependent.clone(),
                            value: forced_value.clone(),
                        });
                    }
                }

                let map: RuleMap = forced
                    .into_iter()
                    .map(|(k, v)| (SettingKey::from(k), v))
                    .collect();
                if value == DEFAULT_RULE_VALUE {
                    rules.fallback = Some(map);
                } else {
                    rules.by_value.insert(value, map);
                }
            }
            drivers.insert(SettingKey::from(driver), rules);
        }

        Ok(Self { drivers })
    }

    /// Rules for `driver` holding `value`
    ///
    /// Falls back to the driver's `default` entry when `value` has none.
    pub fn lookup(&self, driver: &SettingKey, value: &str) -> Option<&RuleMap> {
        let rules = self.drivers.get(driver)?;
        rules.by_value.get(value).or(rules.fallback.as_ref())
    }

    pub fn is_driver(&self, key: &SettingKey) -> bool {
        self.drivers.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Every explicit and default entry, ordered by driver then value
    pub fn entries(&self) -> Vec<(&SettingKey, &str, &RuleMap)> {
        let mut drivers: Vec<_> = self.drivers.iter().collect();
        drivers.sort_by(|a, b| a.0.cmp(b.0));

        let mut entries = Vec::new();
        for (driver, rules) in drivers {
            for (value, map) in &rules.by_value {
                entries.push((driver, value.as_str(), map));
            }
            if let Some(map) = &rules.fallback {
                entries.push((driver, DEFAULT_RULE_VALUE, map));
            }
        }
        entries
    }
}
