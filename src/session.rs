// SPDX-License-Identifier: GPL-3.0-only

//! Session composition root
//!
//! Reads the declarations, rules, capabilities and preferences named by a
//! [`Config`] and builds the [`SettingsEngine`] the rest of the session is
//! handed.

use crate::config::Config;
use crate::errors::AppResult;
use crate::settings::declaration::load_declarations;
use crate::settings::{
    RuleTable, SettingDeclaration, SettingsEngine, StaticCapabilities, StoredPreferences,
};
use tracing::warn;

/// Settings of one camera session
pub struct SettingsSession {
    pub engine: SettingsEngine,
    pub declarations: Vec<SettingDeclaration>,
}

impl SettingsSession {
    pub fn open(config: &Config) -> AppResult<Self> {
        let declarations = load_declarations(&config.declarations)?;
        let rules = RuleTable::load(&config.rules, &declarations)?;
        let capabilities = StaticCapabilities::load(&config.capabilities)?;
        let preferences = StoredPreferences::load(&config.preferences)?;

        let engine = SettingsEngine::new(&declarations, rules, &capabilities, &preferences)?;
        for key in engine.unavailable() {
            warn!(key = %key, "Setting not supported by this camera");
        }

        Ok(Self {
            engine,
            declarations,
        })
    }

    /// Title of `key`, or the key itself
    pub fn title<'a>(&'a self, key: &'a str) -> &'a str {
        self.declarations
            .iter()
            .find(|d| d.key.as_str() == key)
            .and_then(|d| d.title.as_deref())
            .unwrap_or(key)
    }
}
