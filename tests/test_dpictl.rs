//! End-to-end tests for the `dpictl` binary against simulated hosts

mod common;

use std::process::{Command, Output};

use common::test_bitmaps;
use dpi_awareness::Size;
use dpi_awareness::scaling::{load_bitmap, save_bitmap};

fn dpictl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dpictl"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run dpictl")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "dpictl failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn convert_uses_simulated_dpi() {
    let out = dpictl(&["convert", "10", "7", "-5", "--simulate", "tier3", "--simulate-dpi", "144"]);
    assert_eq!(stdout(&out), "15 11 -8");
}

#[test]
fn convert_with_explicit_dpi() {
    let out = dpictl(&["convert", "7", "--dpi", "192", "--simulate", "tier1"]);
    assert_eq!(stdout(&out), "14");
}

#[test]
fn mode_table() {
    assert_eq!(stdout(&dpictl(&["mode", "2"])), "nearest-neighbor");
    assert_eq!(stdout(&dpictl(&["mode", "1.5"])), "bicubic");
    assert!(!dpictl(&["mode", "0"]).status.success());
}

#[test]
fn status_report_is_json() {
    let out = dpictl(&["probe", "--json", "--simulate", "tier2", "--simulate-dpi", "120"]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();

    assert_eq!(report["feature_level"], "tier2");
    assert_eq!(report["process_declared"], true);
    // PerMonitorV2 is not settable at tier2; the ladder lands on PerMonitor.
    assert_eq!(report["thread_tier"], "thread-per-monitor");
    assert_eq!(report["per_monitor_v2_active"], false);
    assert_eq!(report["scale"]["device_dpi"], 120.0);
    assert_eq!(report["scale"]["needs_per_monitor_v2_query"], true);
}

#[test]
fn config_file_selects_process_tier() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("dpi.json");
    std::fs::write(
        &config,
        r#"{ "process_tier": "process-system-aware", "log_filter": "warn" }"#,
    )
    .unwrap();

    let out = dpictl(&[
        "probe",
        "--json",
        "--simulate",
        "tier3",
        "--config",
        config.to_str().unwrap(),
    ]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["process_tier"], "process-system-aware");
}

#[test]
fn tier_flag_overrides_config() {
    let out = dpictl(&["probe", "--json", "--simulate", "tier3", "--tier", "process-system-aware"]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["process_tier"], "process-system-aware");
    assert_eq!(report["per_monitor_v2_active"], false);

    assert!(!dpictl(&["probe", "--simulate", "tier3", "--tier", "unspecified"]).status.success());
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("dpi.json");
    std::fs::write(&config, r#"{ "process_tier": "unspecified" }"#).unwrap();

    let out = dpictl(&["probe", "--config", config.to_str().unwrap(), "--simulate", "tier3"]);
    assert!(!out.status.success());
}

#[test]
fn rescale_writes_device_image() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    save_bitmap(&test_bitmaps::checkerboard(Size::new(4, 4), 2), &input).unwrap();

    let out = dpictl(&[
        "rescale",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        "--dpi",
        "192",
    ]);
    assert!(stdout(&out).starts_with("4x4 -> 8x8"));
    assert_eq!(load_bitmap(&output).unwrap().size(), Size::new(8, 8));
}
