// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for inspecting and changing settings
//!
//! This module provides command-line functionality for:
//! - Showing every setting with its overrides
//! - Applying assignments and printing the resulting changes
//! - Listing rules and unsupported settings

use camera_settings::settings::listener::LogListener;
use camera_settings::settings::SettingSnapshot;
use camera_settings::{Config, SettingsSession};

/// Print every available setting
pub fn show(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = SettingsSession::open(config)?;
    let snapshots = session.engine.snapshots();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    println!("Settings:");
    println!();
    for snapshot in &snapshots {
        print_setting(&session, snapshot);
    }

    Ok(())
}

fn print_setting(session: &SettingsSession, snapshot: &SettingSnapshot) {
    let title = session.title(snapshot.key.as_str());
    if snapshot.forced_by.is_empty() {
        println!("  {:<24} {}", title, snapshot.value);
    } else {
        let drivers: Vec<String> = snapshot.forced_by.iter().map(|k| k.to_string()).collect();
        println!(
            "  {:<24} {} (forced by {}, natural {})",
            title,
            snapshot.value,
            drivers.join(", "),
            snapshot.natural
        );
    }
    println!("      Values: {}", snapshot.labels.join(", "));
}

/// Apply `KEY=VALUE` assignments and print each change batch
pub fn set(config: &Config, assignments: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = SettingsSession::open(config)?;
    session.engine.add_listener(Box::new(LogListener));

    for assignment in assignments {
        let Some((key, value)) = assignment.split_once('=') else {
            return Err(format!("Expected KEY=VALUE, got '{}'", assignment).into());
        };

        match session.engine.set_value(key.trim(), value.trim()) {
            Ok(batch) if batch.is_empty() => println!("{}: unchanged", key.trim()),
            Ok(batch) => {
                for event in &batch {
                    println!("{}", event);
                }
            }
            Err(err) => eprintln!("{}", err),
        }
    }

    Ok(())
}

/// Print the rule table
pub fn rules(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let session = SettingsSession::open(config)?;
    let rules = session.engine.rules();

    if rules.is_empty() {
        println!("No rules.");
        return Ok(());
    }

    for (driver, value, map) in rules.entries() {
        let forced: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        println!("  {}={} -> {}", driver, value, forced.join(", "));
    }

    Ok(())
}

/// Print settings removed by capability filtering
pub fn unavailable(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let session = SettingsSession::open(config)?;
    let unavailable = session.engine.unavailable();

    if unavailable.is_empty() {
        println!("All settings are supported.");
        return Ok(());
    }

    println!("Not supported by this camera:");
    for key in unavailable {
        println!("  {}", session.title(key.as_str()));
    }

    Ok(())
}
