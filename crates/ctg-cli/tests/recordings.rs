use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

#[test]
fn simulate_is_deterministic_per_seed() {
    let temp = tempdir().unwrap();
    let a = temp.path().join("a.csv");
    let b = temp.path().join("b.csv");
    let c = temp.path().join("c.csv");
    for (path, seed) in [(&a, "5"), (&b, "5"), (&c, "6")] {
        Command::cargo_bin("ctg")
            .unwrap()
            .args([
                "simulate",
                path.to_str().unwrap(),
                "--duration",
                "120",
                "--seed",
                seed,
            ])
            .assert()
            .success();
    }
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    assert_ne!(fs::read(&a).unwrap(), fs::read(&c).unwrap());
}

#[test]
fn join_merges_channel_exports() {
    let temp = tempdir().unwrap();
    let bpm = temp.path().join("bpm.csv");
    let uterus = temp.path().join("uterus.csv");
    let out = temp.path().join("recording.csv");
    fs::write(&bpm, "0,140\n1,141\n2,139\n").unwrap();
    fs::write(&uterus, "0,10\n1,12\n2,14\n3,50\n").unwrap();

    Command::cargo_bin("ctg")
        .unwrap()
        .args([
            "join",
            bpm.to_str().unwrap(),
            uterus.to_str().unwrap(),
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&out).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("t,fhr,ua"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn archive_captures_recording_and_events() {
    let temp = tempdir().unwrap();
    let recording = temp.path().join("recording.csv");
    let archive = temp.path().join("session.json");
    Command::cargo_bin("ctg")
        .unwrap()
        .args([
            "simulate",
            recording.to_str().unwrap(),
            "--duration",
            "240",
            "--seed",
            "11",
        ])
        .assert()
        .success();

    Command::cargo_bin("ctg")
        .unwrap()
        .args([
            "archive",
            recording.to_str().unwrap(),
            archive.to_str().unwrap(),
            "--session-id",
            "patient-001",
            "--notes",
            "demo session",
        ])
        .assert()
        .success();

    let json: Value = serde_json::from_str(&fs::read_to_string(&archive).unwrap()).unwrap();
    assert_eq!(json["session_id"], "patient-001");
    assert_eq!(json["notes"], "demo session");
    assert_eq!(json["samples"].as_array().unwrap().len(), 240);
    assert!(json["summary"]["mean_fhr"].as_f64().is_some());
}

#[test]
fn unordered_recording_fails_replay() {
    let temp = tempdir().unwrap();
    let recording = temp.path().join("bad.csv");
    fs::write(&recording, "t,fhr,ua\n0,140,10\n5,141,10\n2,139,10\n").unwrap();

    Command::cargo_bin("ctg")
        .unwrap()
        .args(["replay", recording.to_str().unwrap()])
        .assert()
        .failure();
}
