// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the settings dependency engine

use camera_settings::settings::{
    ChangeEvent, RuleTable, SettingDeclaration, SettingSnapshot, SettingsEngine,
    StaticCapabilities,
};
use camera_settings::{SettingKey, SettingsError};
use std::collections::HashMap;

fn declarations() -> Vec<SettingDeclaration> {
    vec![
        SettingDeclaration::new("scene_mode", "auto", ["auto", "hdr", "night"]),
        SettingDeclaration::new("flash_mode", "auto", ["auto", "on", "off"]),
        SettingDeclaration::new("iso", "auto", ["auto", "100", "800"]),
        SettingDeclaration::new("driver_a", "off", ["off", "on"]),
        SettingDeclaration::new("driver_b", "off", ["off", "on"]),
        SettingDeclaration::new(
            "picture_size",
            "4000x3000",
            ["4000x3000", "9999x9999", "1920x1080"],
        )
        .with_capability(),
    ]
}

const RULES: &str = r#"{
    "scene_mode": {
        "hdr": {"flash_mode": "off"},
        "night": {"flash_mode": "off", "iso": "800"}
    },
    "driver_a": {"on": {"iso": "100"}},
    "driver_b": {"on": {"iso": "100"}}
}"#;

fn capabilities() -> StaticCapabilities {
    StaticCapabilities::new().with("picture_size", ["4000x3000", "1920x1080"])
}

fn create_engine() -> SettingsEngine {
    create_engine_with_prefs(HashMap::new())
}

fn create_engine_with_prefs(prefs: HashMap<String, String>) -> SettingsEngine {
    let decls = declarations();
    let rules = RuleTable::from_json(RULES, &decls).unwrap();
    SettingsEngine::new(&decls, rules, &capabilities(), &prefs).unwrap()
}

fn events(pairs: &[(&str, &str)]) -> Vec<ChangeEvent> {
    pairs.iter().map(|(k, v)| ChangeEvent::new(*k, *v)).collect()
}

/// Effective value equals the override iff someone forces the key
fn assert_consistent(engine: &SettingsEngine) {
    for snapshot in engine.snapshots() {
        let key = snapshot.key.as_str();
        if snapshot.forced_by.is_empty() {
            assert!(!engine.is_overridden(key));
            assert_eq!(snapshot.value, snapshot.natural, "dangling override on {}", key);
        } else {
            assert!(engine.is_overridden(key));
        }
        assert!(snapshot.values.contains(&snapshot.natural));
    }
}

#[test]
fn test_forced_value_applied_and_released() {
    let mut engine = create_engine();

    let batch = engine.set_value("scene_mode", "hdr").unwrap();
    assert_eq!(
        batch.into_events(),
        events(&[("scene_mode", "hdr"), ("flash_mode", "off")])
    );
    assert!(engine.is_overridden("flash_mode"));

    let batch = engine.set_value("scene_mode", "auto").unwrap();
    assert_eq!(
        batch.into_events(),
        events(&[("scene_mode", "auto"), ("flash_mode", "auto")])
    );
    assert!(!engine.is_overridden("flash_mode"));
    assert_consistent(&engine);
}

#[test]
fn test_release_reverts_to_user_choice() {
    let mut engine = create_engine();
    engine.set_value("flash_mode", "on").unwrap();

    engine.set_value("scene_mode", "hdr").unwrap();
    assert_eq!(engine.value("flash_mode"), Some("off"));
    assert_eq!(engine.natural_value("flash_mode"), Some("on"));

    let batch = engine.set_value("scene_mode", "auto").unwrap();
    assert_eq!(batch.value_of("flash_mode"), Some("on"));
    assert_eq!(engine.value("flash_mode"), Some("on"));
}

#[test]
fn test_shared_override_needs_every_driver_released() {
    let mut engine = create_engine();
    engine.set_value("driver_a", "on").unwrap();
    engine.set_value("driver_b", "on").unwrap();
    assert_eq!(engine.value("iso"), Some("100"));

    let batch = engine.set_value("driver_b", "off").unwrap();
    assert_eq!(batch.into_events(), events(&[("driver_b", "off")]));
    assert_eq!(engine.value("iso"), Some("100"));
    assert_eq!(
        engine.overriding_drivers("iso"),
        vec![&SettingKey::new("driver_a")]
    );

    let batch = engine.set_value("driver_a", "off").unwrap();
    assert_eq!(
        batch.into_events(),
        events(&[("driver_a", "off"), ("iso", "auto")])
    );
    assert!(!engine.is_overridden("iso"));
    assert_consistent(&engine);
}

#[test]
fn test_unknown_key_not_found() {
    let mut engine = create_engine();
    let before = engine.snapshots();

    assert_eq!(
        engine.set_value("nonexistent_key", "x"),
        Err(SettingsError::UnknownKey("nonexistent_key".to_string()))
    );
    assert_eq!(engine.snapshots(), before);
}

#[test]
fn test_filtered_value_rejected() {
    let mut engine = create_engine();
    let before = engine.snapshots();

    assert_eq!(
        engine.set_value("picture_size", "9999x9999"),
        Err(SettingsError::ValueNotInDomain {
            key: "picture_size".to_string(),
            value: "9999x9999".to_string(),
        })
    );
    assert_eq!(engine.snapshots(), before);
    assert_eq!(
        engine.domain("picture_size").unwrap(),
        &["4000x3000".to_string(), "1920x1080".to_string()]
    );
}

#[test]
fn test_rejection_while_overridden_is_atomic() {
    let mut engine = create_engine();
    engine.set_value("scene_mode", "night").unwrap();
    let before: Vec<SettingSnapshot> = engine.snapshots();

    assert!(matches!(
        engine.set_value("iso", "100"),
        Err(SettingsError::Overridden { .. })
    ));
    assert_eq!(engine.snapshots(), before);
}

#[test]
fn test_setting_natural_value_is_idempotent() {
    let mut engine = create_engine();
    engine.set_value("scene_mode", "night").unwrap();

    for snapshot in engine.snapshots() {
        let batch = engine
            .set_value(snapshot.key.as_str(), &snapshot.natural)
            .unwrap();
        assert!(batch.is_empty(), "{} produced {}", snapshot.key, batch);
    }
}

#[test]
fn test_driver_change_is_reversible() {
    let mut engine = create_engine();
    engine.set_value("driver_a", "on").unwrap();
    let before = engine.snapshots();

    for value in ["hdr", "night"] {
        engine.set_value("scene_mode", value).unwrap();
        assert_consistent(&engine);
        engine.set_value("scene_mode", "auto").unwrap();
        assert_eq!(engine.snapshots(), before, "after {}", value);
    }
}

#[test]
fn test_driver_event_comes_first() {
    let mut engine = create_engine();
    engine.set_value("scene_mode", "hdr").unwrap();

    // hdr -> night: flash_mode stays forced, iso gets forced
    let batch = engine.set_value("scene_mode", "night").unwrap();
    assert_eq!(
        batch.into_events(),
        events(&[("scene_mode", "night"), ("iso", "800")])
    );

    // night -> hdr: iso released, flash_mode unchanged
    let batch = engine.set_value("scene_mode", "hdr").unwrap();
    assert_eq!(
        batch.into_events(),
        events(&[("scene_mode", "hdr"), ("iso", "auto")])
    );
}

#[test]
fn test_latest_driver_wins_conflict() {
    let mut engine = create_engine();
    engine.set_value("driver_a", "on").unwrap();

    let batch = engine.set_value("scene_mode", "night").unwrap();
    assert_eq!(batch.value_of("iso"), Some("800"));
    assert_eq!(engine.value("iso"), Some("800"));

    // Releasing the latest driver hands the key back to the earlier one
    let batch = engine.set_value("scene_mode", "auto").unwrap();
    assert_eq!(batch.value_of("iso"), Some("100"));
    assert_eq!(engine.value("iso"), Some("100"));
    assert_consistent(&engine);
}

#[test]
fn test_stored_preferences_seed_rules() {
    let prefs = HashMap::from([
        ("scene_mode".to_string(), "night".to_string()),
        ("picture_size".to_string(), "9999x9999".to_string()),
    ]);
    let mut engine = create_engine_with_prefs(prefs);

    assert_eq!(engine.value("iso"), Some("800"));
    assert_eq!(engine.value("flash_mode"), Some("off"));
    // Unsupported stored value falls back to the first supported one
    assert_eq!(engine.value("picture_size"), Some("4000x3000"));

    let batch = engine.set_value("scene_mode", "auto").unwrap();
    assert_eq!(
        batch.into_events(),
        events(&[("scene_mode", "auto"), ("flash_mode", "auto"), ("iso", "auto")])
    );
    assert_consistent(&engine);
}

#[test]
fn test_rule_target_removed_by_capabilities() {
    let decls = vec![
        SettingDeclaration::new("scene_mode", "auto", ["auto", "hdr"]),
        SettingDeclaration::new("flash_mode", "auto", ["auto", "off"]).with_capability(),
    ];
    let rules =
        RuleTable::from_json(r#"{"scene_mode": {"hdr": {"flash_mode": "off"}}}"#, &decls).unwrap();
    let mut engine =
        SettingsEngine::new(&decls, rules, &StaticCapabilities::new(), &()).unwrap();

    assert_eq!(engine.unavailable(), &[SettingKey::new("flash_mode")]);
    assert!(!engine.is_available("flash_mode"));

    let batch = engine.set_value("scene_mode", "hdr").unwrap();
    assert_eq!(batch.into_events(), events(&[("scene_mode", "hdr")]));
    assert_eq!(
        engine.set_value("flash_mode", "off"),
        Err(SettingsError::UnknownKey("flash_mode".to_string()))
    );
}

#[test]
fn test_unsupported_forced_value_skipped() {
    let decls = vec![
        SettingDeclaration::new("scene_mode", "auto", ["auto", "night"]),
        SettingDeclaration::new("iso", "auto", ["auto", "800"]).with_capability(),
    ];
    let rules =
        RuleTable::from_json(r#"{"scene_mode": {"night": {"iso": "800"}}}"#, &decls).unwrap();
    let caps = StaticCapabilities::new().with("iso", ["auto"]);
    let mut engine = SettingsEngine::new(&decls, rules, &caps, &()).unwrap();

    let batch = engine.set_value("scene_mode", "night").unwrap();
    assert_eq!(batch.len(), 1);
    assert!(!engine.is_overridden("iso"));

    let batch = engine.set_value("scene_mode", "auto").unwrap();
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_unsupported_replacement_value_releases_override() {
    let decls = vec![
        SettingDeclaration::new("scene_mode", "auto", ["auto", "hdr", "night"]),
        SettingDeclaration::new("iso", "auto", ["auto", "100", "800"]).with_capability(),
    ];
    let rules = RuleTable::from_json(
        r#"{"scene_mode": {"hdr": {"iso": "100"}, "night": {"iso": "800"}}}"#,
        &decls,
    )
    .unwrap();
    let caps = StaticCapabilities::new().with("iso", ["auto", "100"]);
    let mut engine = SettingsEngine::new(&decls, rules, &caps, &()).unwrap();

    engine.set_value("scene_mode", "hdr").unwrap();
    assert_eq!(engine.value("iso"), Some("100"));

    // night forces 800, which this camera lacks: the hdr override must go
    let batch = engine.set_value("scene_mode", "night").unwrap();
    assert_eq!(
        batch.into_events(),
        events(&[("scene_mode", "night"), ("iso", "auto")])
    );
    assert_eq!(engine.value("iso"), Some("auto"));
    assert!(!engine.is_overridden("iso"));
    assert!(engine.overriding_drivers("iso").is_empty());
    assert_consistent(&engine);

    // Back to a supported value re-applies the override
    let batch = engine.set_value("scene_mode", "hdr").unwrap();
    assert_eq!(
        batch.into_events(),
        events(&[("scene_mode", "hdr"), ("iso", "100")])
    );
    assert_consistent(&engine);
}

#[test]
fn test_reapplied_driver_becomes_latest_writer() {
    let decls = vec![
        SettingDeclaration::new("scene_mode", "auto", ["auto", "hdr", "night"]),
        SettingDeclaration::new("driver_a", "off", ["off", "on"]),
        SettingDeclaration::new("iso", "auto", ["auto", "100", "800"]),
    ];
    let rules = RuleTable::from_json(
        r#"{
            "scene_mode": {"hdr": {"iso": "100"}, "night": {"iso": "800"}},
            "driver_a": {"on": {"iso": "800"}}
        }"#,
        &decls,
    )
    .unwrap();
    let mut engine =
        SettingsEngine::new(&decls, rules, &StaticCapabilities::new(), &()).unwrap();

    engine.set_value("scene_mode", "hdr").unwrap();
    engine.set_value("driver_a", "on").unwrap();
    assert_eq!(engine.value("iso"), Some("800"));

    // Changing the forced value counts as a fresh write, so scene_mode now
    // outranks driver_a even after returning to hdr
    engine.set_value("scene_mode", "night").unwrap();
    engine.set_value("scene_mode", "hdr").unwrap();
    assert_eq!(engine.value("iso"), Some("100"));
    assert_eq!(
        engine.overriding_drivers("iso"),
        vec![&SettingKey::new("driver_a"), &SettingKey::new("scene_mode")]
    );
    assert_consistent(&engine);
}

#[test]
fn test_labels_and_index_queries() {
    let decls = vec![
        SettingDeclaration::new("iso", "auto", ["auto", "100", "800"])
            .with_labels(["Auto", "ISO 100", "ISO 800"])
            .with_title("ISO"),
    ];
    let mut engine =
        SettingsEngine::new(&decls, RuleTable::empty(), &StaticCapabilities::new(), &()).unwrap();

    assert_eq!(engine.labels("iso").unwrap()[2], "ISO 800");
    engine.set_value_index("iso", 1).unwrap();
    assert_eq!(engine.value("iso"), Some("100"));
    assert_eq!(engine.value_index("iso"), Some(1));
    assert_eq!(engine.snapshot("iso").unwrap().title.as_deref(), Some("ISO"));
}
