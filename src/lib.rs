// SPDX-License-Identifier: GPL-3.0-only

//! COSMIC Camera settings engine
//!
//! This library resolves dependencies between camera settings: which values
//! the camera supports, which settings force others while they hold a given
//! value, and which changes consumers must be told about.
//!
//! # Architecture
//!
//! - [`settings`]: declarations, capability filtering, rules and the engine
//! - [`session`]: builds an engine from the files named by a [`Config`]
//! - [`config`]: file locations
//! - [`errors`]: error types
//!
//! # Example
//!
//! ```
//! use camera_settings::settings::{
//!     RuleTable, SettingDeclaration, SettingsEngine, StaticCapabilities,
//! };
//!
//! let declarations = vec![
//!     SettingDeclaration::new("scene_mode", "auto", ["auto", "hdr"]),
//!     SettingDeclaration::new("flash_mode", "auto", ["auto", "on", "off"]),
//! ];
//! let rules = RuleTable::from_json(
//!     r#"{"scene_mode": {"hdr": {"flash_mode": "off"}}}"#,
//!     &declarations,
//! )
//! .unwrap();
//! let mut engine =
//!     SettingsEngine::new(&declarations, rules, &StaticCapabilities::new(), &()).unwrap();
//!
//! let changes = engine.set_value("scene_mode", "hdr").unwrap();
//! assert_eq!(changes.to_string(), "[scene_mode=hdr, flash_mode=off]");
//! assert!(engine.is_overridden("flash_mode"));
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod session;
pub mod settings;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult, SettingsError};
pub use session::SettingsSession;
pub use settings::{ChangeBatch, ChangeEvent, SettingKey, SettingsEngine};
