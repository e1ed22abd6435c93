// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Rule entry used when a driver value has no explicit entry
pub const DEFAULT_RULE_VALUE: &str = "default";

/// Directory name under the user's config dir
pub const APP_CONFIG_DIR: &str = "camera-settings";

/// Configuration file name inside [`APP_CONFIG_DIR`]
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Bundled data files, relative to the working directory
pub mod data {
    /// Setting declarations
    pub const DECLARATIONS: &str = "data/settings.json";

    /// Dependency rules
    pub const RULES: &str = "data/setting_dependencies.json";

    /// Capabilities of the reference camera
    pub const CAPABILITIES: &str = "data/capabilities.json";

    /// Stored user preferences
    pub const PREFERENCES: &str = "data/preferences.json";
}

/// Keys of the settings shipped in the bundled declarations
pub mod keys {
    pub const SCENE_MODE: &str = "scene_mode";
    pub const FLASH_MODE: &str = "flash_mode";
    pub const ISO: &str = "iso";
    pub const EXPOSURE_MODE: &str = "exposure_mode";
    pub const WHITE_BALANCE: &str = "white_balance";
    pub const FOCUS_MODE: &str = "focus_mode";
    pub const PICTURE_SIZE: &str = "picture_size";
    pub const PICTURE_FORMAT: &str = "picture_format";
    pub const BURST_MODE: &str = "burst_mode";
    pub const VIDEO_QUALITY: &str = "video_quality";
    pub const VIDEO_STABILIZATION: &str = "video_stabilization";
}
