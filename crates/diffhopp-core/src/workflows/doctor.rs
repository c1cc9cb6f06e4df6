//! Environment preflight checks.
//!
//! Verifies that the external tools the docking pipeline shells out to are
//! reachable, probes for a CUDA device through `nvidia-smi`, and optionally
//! fires a bounded smoke invocation of the docking engine. The checks never
//! abort each other; every probe lands as a row in the [`DoctorReport`] and
//! the caller decides the exit status from [`DoctorReport::critical_ok`].

use crate::engine::config::ToolPaths;
use crate::engine::exec::{ExecError, ToolCommand, ToolStatus, find_in_path};
use std::env;
use std::time::Duration;
use tracing::{info, instrument};

/// Wall-clock limit for the `nvidia-smi` probe.
const GPU_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable Open Babel reads its data tables from.
const BABEL_DATA_VAR: &str = "BABEL_DATADIR";

/// Outcome of a single preflight check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    /// The check could not run or does not apply; never counts as a failure.
    Skip,
}

/// One row of the doctor's report.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    /// Resolved path, probe output, or the reason the check did not pass.
    pub note: String,
    /// Critical checks decide the doctor's exit status.
    pub critical: bool,
}

/// Full set of preflight results, in the order the checks ran.
#[derive(Debug, Clone)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    /// Returns `false` when any critical check failed. A missing GPU or a
    /// skipped smoke test never fails the doctor; a missing docking engine
    /// does.
    pub fn critical_ok(&self) -> bool {
        self.checks
            .iter()
            .all(|check| !(check.critical && check.status == CheckStatus::Fail))
    }
}

/// Runs the full preflight suite.
///
/// Tool reachability is checked for every binary the docking path invokes,
/// with the GPU docking engine marked critical. When `smoke` is set and the
/// engine is reachable, it is additionally launched under `smoke_limit`; an
/// engine that is still running when the limit expires is reported as
/// healthy, since a wedged launch would have failed long before.
#[instrument(skip_all, name = "doctor_workflow")]
pub fn run(tools: &ToolPaths, smoke: bool, smoke_limit: Duration) -> DoctorReport {
    let checks = vec![
        tool_check("docking engine", &tools.autodock_gpu, true),
        tool_check("grid generator", &tools.autogrid, false),
        tool_check("format converter", &tools.obabel, false),
        tool_check("receptor preparation", &tools.prepare_receptor, false),
        gpu_check(),
        babel_data_check(),
        smoke_check(&tools.autodock_gpu, smoke, smoke_limit),
    ];
    let report = DoctorReport { checks };
    info!(
        critical_ok = report.critical_ok(),
        num_checks = report.checks.len(),
        "environment preflight finished"
    );
    report
}

/// Queries the first GPU's name and memory through `nvidia-smi`.
///
/// Returns `None` when `nvidia-smi` is missing, errors, times out, or
/// reports no devices. Callers treat that as "run on the CPU".
pub fn probe_gpu() -> Option<String> {
    let command = ToolCommand::new("nvidia-smi")
        .arg("--query-gpu=name,memory.total")
        .arg("--format=csv,noheader");
    let output = command.run_with_timeout(GPU_PROBE_TIMEOUT).ok()?;
    if !output.status.success() {
        return None;
    }
    let first = output.stdout.lines().next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

fn tool_check(name: &'static str, program: &str, critical: bool) -> CheckResult {
    match find_in_path(program) {
        Some(path) => CheckResult {
            name,
            status: CheckStatus::Pass,
            note: path.display().to_string(),
            critical,
        },
        None => CheckResult {
            name,
            status: CheckStatus::Fail,
            note: format!("'{program}' not found in PATH"),
            critical,
        },
    }
}

fn gpu_check() -> CheckResult {
    match probe_gpu() {
        Some(device) => CheckResult {
            name: "gpu",
            status: CheckStatus::Pass,
            note: device,
            critical: false,
        },
        None => CheckResult {
            name: "gpu",
            status: CheckStatus::Skip,
            note: "no CUDA device detected; runs fall back to the CPU".to_string(),
            critical: false,
        },
    }
}

fn babel_data_check() -> CheckResult {
    match env::var(BABEL_DATA_VAR) {
        Ok(value) if !value.is_empty() => CheckResult {
            name: "babel data dir",
            status: CheckStatus::Pass,
            note: value,
            critical: false,
        },
        _ => CheckResult {
            name: "babel data dir",
            status: CheckStatus::Skip,
            note: format!("{BABEL_DATA_VAR} is unset; obabel uses its built-in tables"),
            critical: false,
        },
    }
}

/// Launches the docking engine with `--help` under a wall-clock limit.
///
/// An expired limit counts as a pass: the engine launched and kept running,
/// which is all a smoke test can establish without a full docking job.
fn smoke_check(program: &str, requested: bool, limit: Duration) -> CheckResult {
    let name = "engine smoke test";
    if !requested {
        return CheckResult {
            name,
            status: CheckStatus::Skip,
            note: "not requested".to_string(),
            critical: false,
        };
    }
    let command = ToolCommand::new(program).arg("--help");
    match command.run_with_timeout(limit) {
        Ok(output) => match output.status {
            ToolStatus::Exited(0) => CheckResult {
                name,
                status: CheckStatus::Pass,
                note: "responds to --help".to_string(),
                critical: false,
            },
            ToolStatus::TimedOut { limit_secs } => CheckResult {
                name,
                status: CheckStatus::Pass,
                note: format!("still running after {limit_secs}s; launch succeeded"),
                critical: false,
            },
            ToolStatus::Exited(code) => CheckResult {
                name,
                status: CheckStatus::Fail,
                note: format!("exited with status {code}"),
                critical: false,
            },
        },
        Err(ExecError::Launch { .. }) => CheckResult {
            name,
            status: CheckStatus::Skip,
            note: format!("'{program}' is not reachable"),
            critical: false,
        },
        Err(error) => CheckResult {
            name,
            status: CheckStatus::Fail,
            note: error.to_string(),
            critical: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn write_script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn prepend_path(dir: &Path) -> std::ffi::OsString {
        let original = env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![dir.to_path_buf()];
        paths.extend(env::split_paths(&original));
        let joined = env::join_paths(paths).unwrap();
        unsafe { env::set_var("PATH", &joined) };
        original
    }

    #[test]
    #[serial]
    fn probe_reports_the_first_gpu_line() {
        let dir = tempfile::tempdir().unwrap();
        write_script(
            dir.path(),
            "nvidia-smi",
            "echo 'NVIDIA GeForce RTX 3090, 24576 MiB'",
        );
        let original = prepend_path(dir.path());

        let device = probe_gpu();

        unsafe { env::set_var("PATH", original) };
        assert_eq!(device.as_deref(), Some("NVIDIA GeForce RTX 3090, 24576 MiB"));
    }

    #[test]
    #[serial]
    fn probe_treats_a_failing_query_as_no_gpu() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "nvidia-smi", "exit 9");
        let original = prepend_path(dir.path());

        let device = probe_gpu();

        unsafe { env::set_var("PATH", original) };
        assert_eq!(device, None);
    }

    #[test]
    #[serial]
    fn missing_engine_fails_the_critical_check() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "autogrid4", "exit 0");
        let original = prepend_path(dir.path());

        let tools = ToolPaths {
            autodock_gpu: "definitely-not-a-real-engine".to_string(),
            ..ToolPaths::default()
        };
        let report = run(&tools, false, Duration::from_secs(60));

        unsafe { env::set_var("PATH", original) };
        assert!(!report.critical_ok());
        let engine = &report.checks[0];
        assert_eq!(engine.status, CheckStatus::Fail);
        assert!(engine.critical);
        let grid = &report.checks[1];
        assert_eq!(grid.status, CheckStatus::Pass);
    }

    #[test]
    #[serial]
    fn non_critical_failures_do_not_gate_the_doctor() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "autodock_gpu_64wi", "exit 0");
        let original = prepend_path(dir.path());

        let report = run(&ToolPaths::default(), false, Duration::from_secs(60));

        unsafe { env::set_var("PATH", original) };
        assert!(report.critical_ok());
    }

    #[test]
    fn smoke_timeout_counts_as_a_pass() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "engine", "sleep 5");
        let program = dir.path().join("engine");

        let result = smoke_check(
            program.to_str().unwrap(),
            true,
            Duration::from_millis(200),
        );

        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.note.contains("still running"));
    }

    #[test]
    fn smoke_reports_a_crashing_engine() {
        let dir = tempfile::tempdir().unwrap();
        write_script(dir.path(), "engine", "exit 2");
        let program = dir.path().join("engine");

        let result = smoke_check(program.to_str().unwrap(), true, Duration::from_secs(5));

        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.note.contains("status 2"));
    }

    #[test]
    fn smoke_is_skipped_unless_requested() {
        let result = smoke_check("whatever", false, Duration::from_secs(5));
        assert_eq!(result.status, CheckStatus::Skip);
    }
}
