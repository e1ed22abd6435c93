// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the settings engine

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error type used by the binary and the session loader
#[derive(Debug, Clone)]
pub enum AppError {
    /// Per-call setting errors
    Settings(SettingsError),
    /// Rule table loading errors
    Rules(RuleError),
    /// Setting declaration errors
    Declarations(DeclarationError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Errors returned by a single `set_value` call
///
/// Every variant is a rejection: the engine state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Key was never declared, or was removed by the capability filter
    UnknownKey(String),
    /// Value is not part of the key's filtered domain
    ValueNotInDomain { key: String, value: String },
    /// Index is past the end of the key's filtered domain
    IndexOutOfRange { key: String, index: usize },
    /// Key is currently forced by another setting
    Overridden { key: String, drivers: Vec<String> },
}

/// Errors raised while loading and validating a rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Rule document is not valid JSON of the expected shape
    Parse(String),
    /// Rule is keyed on a setting that was never declared
    UnknownDriver(String),
    /// Rule is keyed on a value outside the driver's declared values
    UnknownDriverValue { driver: String, value: String },
    /// Rule forces a setting that was never declared
    UnknownDependent { driver: String, dependent: String },
    /// Rule forces a value outside the dependent's declared values
    UnknownForcedValue {
        driver: String,
        dependent: String,
        value: String,
    },
    /// Rule makes a setting force itself
    SelfDependency(String),
}

/// Errors raised while loading setting declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// Declaration document is not valid JSON of the expected shape
    Parse(String),
    /// Same key declared twice
    DuplicateKey(String),
    /// Setting declares no values
    EmptyDomain(String),
    /// Declared default is not one of the declared values
    DefaultNotInDomain { key: String, default: String },
    /// Labels and values differ in length
    LabelMismatch {
        key: String,
        values: usize,
        labels: usize,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Settings(e) => write!(f, "Setting error: {}", e),
            AppError::Rules(e) => write!(f, "Rule error: {}", e),
            AppError::Declarations(e) => write!(f, "Declaration error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::UnknownKey(key) => write!(f, "Unknown setting '{}'", key),
            SettingsError::ValueNotInDomain { key, value } => {
                write!(f, "Value '{}' is not available for '{}'", value, key)
            }
            SettingsError::IndexOutOfRange { key, index } => {
                write!(f, "Index {} is out of range for '{}'", index, key)
            }
            SettingsError::Overridden { key, drivers } => write!(
                f,
                "Setting '{}' is forced by {}",
                key,
                drivers.join(", ")
            ),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::Parse(msg) => write!(f, "Invalid rule document: {}", msg),
            RuleError::UnknownDriver(key) => write!(f, "Rule for undeclared setting '{}'", key),
            RuleError::UnknownDriverValue { driver, value } => {
                write!(f, "Rule for '{}' uses undeclared value '{}'", driver, value)
            }
            RuleError::UnknownDependent { driver, dependent } => write!(
                f,
                "Rule for '{}' forces undeclared setting '{}'",
                driver, dependent
            ),
            RuleError::UnknownForcedValue {
                driver,
                dependent,
                value,
            } => write!(
                f,
                "Rule for '{}' forces undeclared value '{}' on '{}'",
                driver, value, dependent
            ),
            RuleError::SelfDependency(key) => write!(f, "Setting '{}' forces itself", key),
        }
    }
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationError::Parse(msg) => write!(f, "Invalid declaration document: {}", msg),
            DeclarationError::DuplicateKey(key) => write!(f, "Setting '{}' declared twice", key),
            DeclarationError::EmptyDomain(key) => write!(f, "Setting '{}' has no values", key),
            DeclarationError::DefaultNotInDomain { key, default } => write!(
                f,
                "Default '{}' of '{}' is not one of its values",
                default, key
            ),
            DeclarationError::LabelMismatch {
                key,
                values,
                labels,
            } => write!(
                f,
                "Setting '{}' has {} values but {} labels",
                key, values, labels
            ),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for SettingsError {}
impl std::error::Error for RuleError {}
impl std::error::Error for DeclarationError {}

// Conversions from sub-errors to AppError
impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::Settings(err)
    }
}

impl From<RuleError> for AppError {
    fn from(err: RuleError) -> Self {
        AppError::Rules(err)
    }
}

impl From<DeclarationError> for AppError {
    fn from(err: DeclarationError) -> Self {
        AppError::Declarations(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

// Conversions for I/O errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
