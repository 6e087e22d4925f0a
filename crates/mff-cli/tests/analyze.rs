use assert_cmd::cargo::cargo_bin_cmd;
use mff_lib::metrics::MuscleFunctionSummary;
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Ramp 0 -> 100 over 200 samples, plateau with a 20 Hz superimposed
/// twitch, ramp down, 20 Hz resting twitch on the baseline. Same trace the
/// library pipeline tests use.
fn write_recording(path: &Path) -> Result<(), Box<dyn Error>> {
    use std::f64::consts::PI;
    let tone = |i: usize, amp: f64| amp * (2.0 * PI * 20.0 * i as f64 / 1000.0).sin();
    let mut file = fs::File::create(path)?;
    for i in 0..900usize {
        let v = match i {
            0..=199 => i as f64 * 0.5,
            200..=499 => {
                100.0
                    + if (300..400).contains(&i) {
                        tone(i - 300, 2.0)
                    } else {
                        0.0
                    }
            }
            500..=549 => 100.0 - (i - 500) as f64 * 2.0,
            _ => {
                if (650..750).contains(&i) {
                    tone(i - 650, 4.0)
                } else {
                    0.0
                }
            }
        };
        writeln!(file, "{v}")?;
    }
    Ok(())
}

fn assert_close(a: f64, b: f64, tol: f64) {
    let diff = (a - b).abs();
    assert!(diff <= tol, "diff {diff} exceeded tol {tol} ({a} vs {b})");
}

#[test]
fn analyze_reports_the_ramp_metrics() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let recording = dir.path().join("p03_mvc.txt");
    write_recording(&recording)?;

    let mut cmd = cargo_bin_cmd!("mff");
    cmd.args([
        "analyze",
        "--text-input",
        recording.to_str().expect("utf8 path"),
        "--fs",
        "1000",
        "--kgf-to-newtons",
        "1.0",
        "--ttp-start",
        "0",
        "--mvif-window",
        "230,290",
        "--ac-points",
        "300,400,650,750",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let summary: MuscleFunctionSummary = serde_json::from_slice(&output)?;

    assert_eq!(summary.participant, "p03_mvc");
    assert_close(summary.mvif, 100.0, 1.5);
    assert_close(summary.ttp63_ms, 126.0, 2.0);
    assert_close(summary.rfd50, 500.0, 25.0);
    assert_close(summary.ac, 50.0, 3.0);

    let report = dir.path().join("Risultati AC.csv");
    let text = fs::read_to_string(&report)?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Participant,MViF (N),TTP63 (mSec),RFD50 (N/Sec),RFD100 (N/Sec),RFD150 (N/Sec),RFD200 (N/Sec),AC (%)"
    );
    assert!(lines.next().unwrap().starts_with("p03_mvc,"));
    Ok(())
}

#[test]
fn wrong_pick_count_fails_and_writes_nothing() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let recording = dir.path().join("p03_mvc.txt");
    write_recording(&recording)?;

    let mut cmd = cargo_bin_cmd!("mff");
    cmd.args([
        "analyze",
        "--text-input",
        recording.to_str().expect("utf8 path"),
        "--kgf-to-newtons",
        "1.0",
        "--ttp-start",
        "0",
        "--mvif-window",
        "230,290",
        "--ac-points",
        "300,400,650",
    ]);
    let assert = cmd.assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(
        stderr.contains("repeat the selection"),
        "stderr was: {stderr}"
    );
    assert!(!dir.path().join("Risultati AC.csv").exists());
    Ok(())
}

#[test]
fn out_dir_overrides_the_report_location() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    let recording = dir.path().join("p03_mvc.txt");
    write_recording(&recording)?;

    let mut cmd = cargo_bin_cmd!("mff");
    cmd.args([
        "analyze",
        "--text-input",
        recording.to_str().expect("utf8 path"),
        "--kgf-to-newtons",
        "1.0",
        "--ttp-start",
        "0",
        "--mvif-window",
        "230,290",
        "--ac-points",
        "300,400,650,750",
        "--out-dir",
        out.path().to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();
    assert!(out.path().join("Risultati AC.csv").exists());
    assert!(!dir.path().join("Risultati AC.csv").exists());
    Ok(())
}
