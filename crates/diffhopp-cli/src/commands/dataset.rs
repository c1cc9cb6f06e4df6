use crate::cli::DatasetArgs;
use crate::error::Result;
use diffhopp::core::dataset::{self, DatasetIndex};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

pub fn run(args: DatasetArgs) -> Result<()> {
    let data_root = dataset::resolve_data_root(args.data_root.as_deref());
    info!(root = %data_root.display(), name = %args.name, "inspecting dataset");

    let counts = dataset::split_counts(&data_root, &args.name)?;
    let index = DatasetIndex::load(&data_root, &args.name)?;

    print!(
        "{}",
        render_report(&args.name, &data_root.join(&args.name), &counts, index.len())
    );
    Ok(())
}

fn render_report(
    name: &str,
    location: &Path,
    counts: &[(&'static str, usize)],
    valid_test_complexes: usize,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dataset: {name}");
    let _ = writeln!(out, "Location: {}", location.display());
    let mut total = 0;
    for (split, count) in counts {
        let _ = writeln!(out, "  {split:<6} {count:>6} complexes");
        total += count;
    }
    let _ = writeln!(out, "Total: {total} complexes");
    let _ = writeln!(
        out,
        "✓ Test split is ready: {valid_test_complexes} valid complex(es)."
    );
    out
}
