use crate::cli::DoctorArgs;
use crate::error::{CliError, Result};
use diffhopp::engine::config::ToolPaths;
use diffhopp::workflows::doctor::{self, CheckStatus, DoctorReport};
use std::fmt::Write;
use std::time::Duration;

pub fn run(args: DoctorArgs) -> Result<()> {
    let report = doctor::run(
        &ToolPaths::default(),
        !args.skip_smoke_test,
        Duration::from_secs(args.timeout_secs),
    );
    print!("{}", render(&report));

    if report.critical_ok() {
        println!();
        println!("✓ Environment is ready for docking.");
        Ok(())
    } else {
        Err(CliError::Environment(
            "critical environment checks failed".to_string(),
        ))
    }
}

fn render(report: &DoctorReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Environment checks:");
    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "✓ PASS",
            CheckStatus::Fail => "✗ FAIL",
            CheckStatus::Skip => "⚠ SKIP",
        };
        let _ = writeln!(out, "  {:<22} {:<7} {}", check.name, marker, check.note);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffhopp::workflows::doctor::CheckResult;

    fn check(name: &'static str, status: CheckStatus, critical: bool) -> CheckResult {
        CheckResult {
            name,
            status,
            note: "note".to_string(),
            critical,
        }
    }

    #[test]
    fn table_shows_one_marker_per_check() {
        let report = DoctorReport {
            checks: vec![
                check("docking engine", CheckStatus::Pass, true),
                check("gpu", CheckStatus::Skip, false),
                check("format converter", CheckStatus::Fail, false),
            ],
        };

        let rendered = render(&report);
        assert!(rendered.starts_with("Environment checks:\n"));
        assert!(rendered.contains("docking engine         ✓ PASS  note"));
        assert!(rendered.contains("gpu                    ⚠ SKIP  note"));
        assert!(rendered.contains("format converter       ✗ FAIL  note"));
    }

    #[test]
    fn critical_failure_turns_into_an_error() {
        let report = DoctorReport {
            checks: vec![check("docking engine", CheckStatus::Fail, true)],
        };
        assert!(!report.critical_ok());
    }
}
