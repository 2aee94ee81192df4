use billing_core::config::{AlertOptions, EngineConfig};
use std::fs;

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("billing-core-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn shipped_config_matches_defaults() {
    let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
    let config = EngineConfig::load(data_dir).unwrap();
    assert_eq!(config.alerts, AlertOptions::default());
    assert!(!config.is_active_status("Baja"));
    assert!(config.is_active_status("Activo"));
}

#[test]
fn partial_file_takes_defaults_for_the_rest() {
    let dir = scratch_dir("partial");
    fs::write(dir.join("billing.json"), r#"{"alerts":{"upcoming_horizon_days":7}}"#).unwrap();
    let config = EngineConfig::load(dir.to_str().unwrap()).unwrap();
    assert_eq!(config.alerts.upcoming_horizon_days, 7);
    assert_eq!(config.alerts.overdue_confirm_days, 5);
    assert_eq!(config.inactive_statuses, EngineConfig::default().inactive_statuses);
}

#[test]
fn missing_file_names_the_path() {
    let dir = scratch_dir("missing");
    let err = EngineConfig::load(dir.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("billing.json"), "{err}");
}

#[test]
fn oversized_window_fails_validation() {
    let dir = scratch_dir("oversized");
    fs::write(dir.join("billing.json"), r#"{"alerts":{"overdue_confirm_days":40}}"#).unwrap();
    let err = EngineConfig::load(dir.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("overdue_confirm_days"), "{err}");
}

#[test]
fn absent_file_is_not_an_error_but_broken_files_are() {
    let empty = scratch_dir("absent");
    assert!(EngineConfig::load_if_present(empty.to_str().unwrap()).unwrap().is_none());

    let invalid = scratch_dir("invalid-window");
    fs::write(invalid.join("billing.json"), r#"{"alerts":{"overdue_confirm_days":40}}"#).unwrap();
    let err = EngineConfig::load_if_present(invalid.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("overdue_confirm_days"), "{err}");

    let syntax = scratch_dir("syntax");
    fs::write(syntax.join("billing.json"), "{ not json").unwrap();
    assert!(EngineConfig::load_if_present(syntax.to_str().unwrap()).is_err());

    let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
    let shipped = EngineConfig::load_if_present(data_dir).unwrap().unwrap();
    assert_eq!(shipped.alerts, AlertOptions::default());
}
