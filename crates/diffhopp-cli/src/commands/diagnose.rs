use crate::cli::DiagnoseArgs;
use crate::error::Result;
use diffhopp::workflows::diagnose::{self, Diagnosis};
use std::fmt::Write;

pub fn run(args: DiagnoseArgs) -> Result<()> {
    let diagnosis = diagnose::run(&args.results_dir, args.checkpoint.as_deref())?;
    print!("{}", render(&diagnosis));

    let warnings = diagnosis.warnings();
    if !warnings.is_empty() {
        for warning in &warnings {
            println!("⚠ {warning}");
        }
    } else if diagnosis.connectivity_is_good() {
        println!("✓ Connectivity looks good.");
    } else if let Some(summary) = &diagnosis.summary {
        println!(
            "Mean connectivity ratio {:.2} is below the healthy range.",
            summary.mean_ratio
        );
    }
    Ok(())
}

fn render(diagnosis: &Diagnosis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Connectivity report for {} ({} file(s), {} skipped):",
        diagnosis.dir.display(),
        diagnosis.files.len(),
        diagnosis.num_skipped
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<20} {:>6} {:>6} {:>12} {:>12} {:>10}",
        "File", "Atoms", "Bonds", "Close pairs", "Conn. ratio", "Min dist"
    );
    for file in &diagnosis.files {
        let report = &file.report;
        let min_distance = report
            .min_distance
            .map(|d| format!("{d:.3}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<20} {:>6} {:>6} {:>12} {:>12.2} {:>10}",
            file.file_name,
            report.num_atoms,
            report.num_bonds,
            report.close_pairs,
            report.connectivity_ratio,
            min_distance
        );
    }

    if let Some(summary) = &diagnosis.summary {
        let _ = writeln!(out);
        let _ = writeln!(out, "Statistics over {} molecule(s):", summary.total);
        let _ = writeln!(
            out,
            "  bonds:            mean {:.2}, std {:.2}",
            summary.mean_bonds, summary.std_bonds
        );
        let _ = writeln!(
            out,
            "  conn. ratio:      mean {:.2}, std {:.2}",
            summary.mean_ratio, summary.std_ratio
        );
        let _ = writeln!(out, "  zero bonds:       {}", summary.zero_bond_count);
        let _ = writeln!(out, "  poorly connected: {}", summary.poorly_connected);
        let _ = writeln!(out, "  well connected:   {}", summary.well_connected);
    }

    if let Some(checkpoint) = &diagnosis.checkpoint {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Checkpoint: {} ({}, {:.1} MB)",
            checkpoint.name,
            checkpoint.kind,
            checkpoint.size_bytes as f64 / (1024.0 * 1024.0)
        );
    }

    out
}
