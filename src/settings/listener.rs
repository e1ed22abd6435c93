// SPDX-License-Identifier: GPL-3.0-only

//! Change listeners
//!
//! Listeners run inline, once per batch, after the engine has finished
//! updating its state. They cannot call back into the engine; changes they
//! want to make are queued in [`FollowUps`] and applied once every listener
//! has seen the current batch.

use super::{ChangeBatch, SettingKey};
use std::collections::VecDeque;
use tracing::info;

/// Observer of setting changes
pub trait SettingsListener {
    fn on_settings_changed(&mut self, changes: &ChangeBatch, follow_ups: &mut FollowUps);
}

impl<F> SettingsListener for F
where
    F: FnMut(&ChangeBatch, &mut FollowUps),
{
    fn on_settings_changed(&mut self, changes: &ChangeBatch, follow_ups: &mut FollowUps) {
        self(changes, follow_ups)
    }
}

/// Handle returned by `add_listener`, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Setting changes requested from inside a listener
#[derive(Debug, Default)]
pub struct FollowUps {
    pending: VecDeque<(SettingKey, String)>,
}

impl FollowUps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `key = value`, applied after the current batch
    pub fn set_value(&mut self, key: &str, value: &str) {
        self.pending
            .push_back((SettingKey::new(key), value.to_string()));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn pop(&mut self) -> Option<(SettingKey, String)> {
        self.pending.pop_front()
    }
}

/// Writes every batch to the log
#[derive(Debug, Default)]
pub struct LogListener;

impl SettingsListener for LogListener {
    fn on_settings_changed(&mut self, changes: &ChangeBatch, _follow_ups: &mut FollowUps) {
        info!(changes = %changes, "Settings changed");
    }
}
