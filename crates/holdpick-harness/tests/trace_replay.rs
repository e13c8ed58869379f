//! Replay of the recorded fixture traces and the CLI on top of them.

use std::fs;
use std::path::{Path, PathBuf};

use holdpick_core::{CancelReason, GesturePhase, SessionOutcome};
use holdpick_harness::cli::{Cli, Commands, ReplayArgs, VerifyArgs, run};
use holdpick_harness::{HarnessError, Observation, Trace, replay};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn run_cli(command: Commands) -> (Result<(), HarnessError>, String) {
    let mut out = Vec::new();
    let result = run(
        Cli {
            log_json: false,
            command,
        },
        &mut out,
    );
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn hold_drag_release_fixture() {
    let trace = Trace::load(&fixture("hold_drag_release.jsonl")).expect("load");
    let report = replay(&trace).expect("replay");

    assert_eq!(
        report.observations,
        vec![
            Observation::PickerOpened {
                ts_ms: 300,
                highlighted: 4
            },
            Observation::HighlightChanged {
                ts_ms: 300,
                index: 4
            },
            Observation::HighlightChanged {
                ts_ms: 350,
                index: 3
            },
            Observation::HighlightChanged {
                ts_ms: 400,
                index: 1
            },
            Observation::Attached {
                ts_ms: 500,
                index: 1,
                id: "2".to_owned()
            },
            Observation::PickerClosed {
                ts_ms: 500,
                outcome: SessionOutcome::Committed { index: 1 }
            },
            Observation::Sent {
                ts_ms: 500,
                text: "see this".to_owned(),
                attachment: Some("2".to_owned())
            },
        ]
    );
    assert_eq!(report.final_phase, GesturePhase::Idle);
    assert_eq!(report.attachment, None);
    assert_eq!(report.ignored_inputs, 0);
    assert!(!report.capturing_at_end);
}

#[test]
fn tap_then_cancel_fixture() {
    let trace = Trace::load(&fixture("tap_then_cancel.jsonl")).expect("load");
    let report = replay(&trace).expect("replay");

    assert_eq!(
        report.observations,
        vec![
            Observation::PickerOpened {
                ts_ms: 1300,
                highlighted: 2
            },
            Observation::HighlightChanged {
                ts_ms: 1300,
                index: 2
            },
            Observation::HighlightChanged {
                ts_ms: 1350,
                index: 0
            },
            Observation::PickerClosed {
                ts_ms: 1400,
                outcome: SessionOutcome::Cancelled {
                    reason: CancelReason::FocusLost
                }
            },
        ]
    );
    assert_eq!(report.attachment, None);
    // The secondary-button press.
    assert_eq!(report.ignored_inputs, 1);
    assert_eq!(report.final_phase, GesturePhase::Idle);
}

#[test]
fn fixtures_replay_to_stable_checksums() {
    for name in ["hold_drag_release.jsonl", "tap_then_cancel.jsonl"] {
        let trace = Trace::load(&fixture(name)).expect("load");
        let first = replay(&trace).expect("first");
        let second = replay(&trace).expect("second");
        assert_eq!(first.checksum, second.checksum, "{name}");
    }
}

#[test]
fn jsonl_rewrite_preserves_checksum() {
    let trace = Trace::load(&fixture("hold_drag_release.jsonl")).expect("load");
    let dir = tempdir().expect("tempdir");
    let copy = dir.path().join("copy.jsonl");
    fs::write(&copy, trace.to_jsonl().expect("encode")).expect("write");

    let original = replay(&trace).expect("original");
    let rewritten = replay(&Trace::load(&copy).expect("reload")).expect("rewritten");
    assert_eq!(original, rewritten);
}

#[test]
fn replay_command_prints_observations_and_checksum() {
    let path = fixture("hold_drag_release.jsonl");
    let expected = replay(&Trace::load(&path).expect("load")).expect("replay");

    let (result, out) = run_cli(Commands::Replay(ReplayArgs {
        path: path.clone(),
        json: false,
    }));
    result.expect("replay command");
    assert!(out.contains("attached index=1 id=2"));
    assert!(out.ends_with(&format!("checksum {}\n", expected.checksum_hex())));

    let (result, out) = run_cli(Commands::Replay(ReplayArgs { path, json: true }));
    result.expect("replay --json");
    let value: serde_json::Value = serde_json::from_str(&out).expect("json report");
    assert_eq!(value["checksum"], serde_json::json!(expected.checksum));
    assert_eq!(value["observations"][0]["event"], "picker_opened");
    assert_eq!(value["final_phase"], "idle");
}

#[test]
fn verify_command_accepts_matching_checksum() {
    let path = fixture("tap_then_cancel.jsonl");
    let report = replay(&Trace::load(&path).expect("load")).expect("replay");

    let (result, out) = run_cli(Commands::Verify(VerifyArgs {
        path,
        checksum: format!("0x{}", report.checksum_hex()),
    }));
    result.expect("verify");
    assert_eq!(out, format!("ok {}\n", report.checksum_hex()));
}

#[test]
fn verify_command_rejects_mismatch() {
    let (result, out) = run_cli(Commands::Verify(VerifyArgs {
        path: fixture("tap_then_cancel.jsonl"),
        checksum: "0".to_owned(),
    }));
    let err = result.expect_err("mismatch");
    assert!(matches!(err, HarnessError::ChecksumMismatch { expected: 0, .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(out.is_empty());
}

#[test]
fn malformed_trace_fails_with_line_number() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.jsonl");
    fs::write(
        &path,
        "{\"record\":\"header\"}\n{\"record\":\"tick\",\"ts_ms\":\"soon\"}\n",
    )
    .expect("write");

    let (result, _) = run_cli(Commands::Replay(ReplayArgs { path, json: false }));
    let err = result.expect_err("parse failure");
    assert!(matches!(err, HarnessError::ParseRecord { line: 2, .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn invalid_header_config_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad_config.jsonl");
    fs::write(&path, "{\"record\":\"header\",\"config\":{\"long_press_ms\":0}}\n").expect("write");

    let (result, _) = run_cli(Commands::Replay(ReplayArgs { path, json: false }));
    let err = result.expect_err("config failure");
    assert!(matches!(err, HarnessError::Config(_)));
    assert_eq!(err.exit_code(), 4);
}
