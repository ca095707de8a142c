use assert_cmd::Command;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

// Minimal valid config; fast polling keeps simulated runs short.
fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
[run]
direction = "cw"
poll_hz = 1
stop_at_target = true

[motor]
steps_per_mm = 80.0
max_speed_mm_per_min = 5000.0
{extra}
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn pultruder(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("pultruder_cli").unwrap();
    cmd.arg("--config").arg(cfg).arg("--log-level").arg("error");
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "ok: steps_per_mm=80", "stdout")]
#[case(&["run", "--line-speed", "600"], 2, "required", "stderr")]
#[case(
    &["--simulated-time", "run", "--filament-length", "10", "--line-speed", "abc", "--breaking-force", "50"],
    3,
    "Line Speed (mm/min) is not a number ('abc')",
    "stderr"
)]
#[case(
    &["--simulated-time", "run", "--filament-length", "", "--line-speed", "600", "--breaking-force", "50"],
    3,
    "Filament Length (m) is empty",
    "stderr"
)]
#[case(
    &["--simulated-time", "run", "--filament-length", "10", "--line-speed", "9000", "--breaking-force", "50"],
    5,
    "motor driver refused",
    "stderr"
)]
#[case(&["--simulated-time", "test-drive", "--speed", "9000"], 5, "motor driver refused", "stderr")]
#[case(&["--simulated-time", "test-drive", "--speed", "x"], 3, "Manual Motor Speed", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let mut cmd = pultruder(&cfg);
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert().code(exit_code);

    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn simulated_run_pauses_at_target() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let out = pultruder(&cfg)
        .args([
            "--simulated-time",
            "run",
            "--filament-length",
            "0.6",
            "--line-speed",
            "600",
            "--breaking-force",
            "50",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&out);
    assert!(
        stdout.contains("RUNNING  00:00:30  length 0.300 m  complete 50.0 %"),
        "stdout was: {stdout}"
    );
    let last = stdout.lines().last().unwrap_or("");
    assert_eq!(
        last,
        "Run paused (target length reached): 00:01:00 elapsed, 0.600 m produced, 100.0 % complete"
    );
}

#[rstest]
fn max_seconds_bounds_the_run() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    pultruder(&cfg)
        .args([
            "--simulated-time",
            "run",
            "--filament-length",
            "10",
            "--line-speed",
            "600",
            "--breaking-force",
            "50",
            "--max-seconds",
            "60",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Run paused (time limit reached): 00:01:00 elapsed, 0.600 m produced, 6.0 % complete",
        ));
}

#[rstest]
fn simulated_run_without_progress_needs_a_limit() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    pultruder(&cfg)
        .args([
            "--simulated-time",
            "run",
            "--filament-length",
            "10",
            "--line-speed",
            "0",
            "--breaking-force",
            "50",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--max-seconds"));
}

#[rstest]
fn negative_line_speed_is_refused_by_the_drive() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    pultruder(&cfg)
        .args([
            "--simulated-time",
            "run",
            "--filament-length",
            "10",
            "--line-speed",
            "-600",
            "--breaking-force",
            "50",
        ])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("motor driver refused"))
        .stderr(predicate::str::contains("-600"));
}

#[rstest]
fn require_positive_rejects_zero_speed() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[validation]\nrequire_positive = true\n");

    pultruder(&cfg)
        .args([
            "--simulated-time",
            "run",
            "--filament-length",
            "10",
            "--line-speed",
            "0",
            "--breaking-force",
            "50",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("must be greater than zero"));
}

#[rstest]
fn invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[run]\npoll_hz = 0\n").unwrap();

    Command::cargo_bin("pultruder_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration could not be loaded"))
        .stderr(predicate::str::contains("poll_hz"));
}

#[rstest]
fn session_drives_the_panel_from_stdin() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let script = "\
set filament_length 10
set line_speed 600
set breaking_force 50
start
start
wait 30
pause
wait 70
resume
wait 30
status
restart
status
quit
";

    let out = pultruder(&cfg)
        .args(["--simulated-time", "session"])
        .write_stdin(script)
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Cannot start while the machine is running",
        ))
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&out);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.contains(&"PAUSED   00:00:30  length 0.300 m  complete 3.0 %"));
    assert!(lines.contains(&"RUNNING  00:01:00  length 0.600 m  complete 6.0 %"));
    assert_eq!(
        lines.last().copied(),
        Some("INACTIVE 00:00:00  length 0.000 m  complete 0.0 %")
    );
}

#[rstest]
fn session_logs_to_configured_file() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("run.log");
    let cfg = write_config(
        &dir,
        &format!(
            "[logging]\nfile = {:?}\nlevel = \"info\"\nrotation = \"never\"\n",
            log.display().to_string()
        ),
    );

    Command::cargo_bin("pultruder_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["--simulated-time", "session"])
        .write_stdin("set filament_length 1\nset line_speed 10\nset breaking_force 1\nstart\n")
        .assert()
        .success();

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("run start"), "log was: {text}");
}
