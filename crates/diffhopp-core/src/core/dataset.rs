//! Indexing of processed protein-ligand datasets on disk.
//!
//! A processed dataset lives at `<data_root>/<name>/<split>/<complex_id>/`
//! with one `protein.pdb` and one `ligand.sdf` per complex. The evaluation
//! pipeline only ever consumes the `test` split; the other splits are merely
//! counted for reporting.

use crate::core::models::complex::Complex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Environment variable overriding where processed datasets are stored.
pub const DATA_ROOT_ENV: &str = "DIFFUSION_HOPPING_DATA_ROOT";

/// Fallback data root when neither a flag nor the environment provides one.
pub const DEFAULT_DATA_ROOT: &str = "data";

/// The split names a processed dataset may carry.
pub const SPLITS: [&str; 3] = ["train", "val", "test"];

/// Resolves the data root with flag-over-environment-over-default precedence.
pub fn resolve_data_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(value) = env::var_os(DATA_ROOT_ENV) {
        if !value.is_empty() {
            return PathBuf::from(value);
        }
    }
    PathBuf::from(DEFAULT_DATA_ROOT)
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("data root not found: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("dataset '{name}' not found at '{path}'", path = path.display())]
    NotFound { name: String, path: PathBuf },
    #[error("dataset '{name}' has no '{split}' split at '{path}'", path = path.display())]
    MissingSplit {
        name: String,
        split: &'static str,
        path: PathBuf,
    },
    #[error("dataset '{name}' contains no usable complexes in its '{split}' split")]
    EmptySplit { name: String, split: &'static str },
    #[error("failed to scan '{path}': {source}", path = path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The test split of a processed dataset, indexed and ready for iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetIndex {
    /// Dataset name (its directory under the data root).
    pub name: String,
    /// The dataset directory itself.
    pub root: PathBuf,
    /// Complexes of the test split, sorted by identifier.
    pub complexes: Vec<Complex>,
}

fn subdirectories(path: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let entries = fs::read_dir(path).map_err(|source| DatasetError::Scan {
        path: path.to_path_buf(),
        source,
    })?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DatasetError::Scan {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

impl DatasetIndex {
    /// Loads the test split of `name` from under `data_root`.
    ///
    /// Complexes missing either of their two files are skipped with a
    /// warning; the load only fails when nothing usable remains.
    pub fn load(data_root: &Path, name: &str) -> Result<Self, DatasetError> {
        if !data_root.is_dir() {
            return Err(DatasetError::RootNotFound(data_root.to_path_buf()));
        }
        let root = data_root.join(name);
        if !root.is_dir() {
            return Err(DatasetError::NotFound {
                name: name.to_string(),
                path: root,
            });
        }
        let test_dir = root.join("test");
        if !test_dir.is_dir() {
            return Err(DatasetError::MissingSplit {
                name: name.to_string(),
                split: "test",
                path: test_dir,
            });
        }

        let mut complexes = Vec::new();
        for dir in subdirectories(&test_dir)? {
            let Some(complex) = Complex::from_dir(&dir) else {
                continue;
            };
            if complex.is_complete() {
                complexes.push(complex);
            } else {
                warn!(complex = %complex.id, "skipping complex with missing protein.pdb or ligand.sdf");
            }
        }
        if complexes.is_empty() {
            return Err(DatasetError::EmptySplit {
                name: name.to_string(),
                split: "test",
            });
        }

        Ok(Self {
            name: name.to_string(),
            root,
            complexes,
        })
    }

    /// Number of complexes in the index.
    pub fn len(&self) -> usize {
        self.complexes.len()
    }

    /// Returns `true` if the index holds no complexes.
    pub fn is_empty(&self) -> bool {
        self.complexes.is_empty()
    }

    /// Keeps only the first `limit` complexes, in identifier order.
    pub fn truncate(&mut self, limit: usize) {
        self.complexes.truncate(limit);
    }
}

/// Counts the complexes present in each split of a dataset.
///
/// Splits that do not exist on disk are reported with a count of zero rather
/// than omitted, so reports always show all three.
pub fn split_counts(data_root: &Path, name: &str) -> Result<Vec<(&'static str, usize)>, DatasetError> {
    if !data_root.is_dir() {
        return Err(DatasetError::RootNotFound(data_root.to_path_buf()));
    }
    let root = data_root.join(name);
    if !root.is_dir() {
        return Err(DatasetError::NotFound {
            name: name.to_string(),
            path: root,
        });
    }

    let mut counts = Vec::with_capacity(SPLITS.len());
    for split in SPLITS {
        let dir = root.join(split);
        let count = if dir.is_dir() {
            subdirectories(&dir)?.len()
        } else {
            0
        };
        counts.push((split, count));
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn write_complex(dir: &Path, id: &str, complete: bool) {
        let complex_dir = dir.join(id);
        fs::create_dir_all(&complex_dir).unwrap();
        fs::write(complex_dir.join("protein.pdb"), "END\n").unwrap();
        if complete {
            fs::write(complex_dir.join("ligand.sdf"), "$$$$\n").unwrap();
        }
    }

    fn fixture_dataset(root: &Path, name: &str) {
        let test_dir = root.join(name).join("test");
        fs::create_dir_all(&test_dir).unwrap();
        write_complex(&test_dir, "2xyz", true);
        write_complex(&test_dir, "1abc", true);
        write_complex(&test_dir, "3bad", false);
    }

    #[test]
    #[serial]
    fn data_root_prefers_flag_over_environment() {
        unsafe { env::set_var(DATA_ROOT_ENV, "/from/env") };
        assert_eq!(
            resolve_data_root(Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(resolve_data_root(None), PathBuf::from("/from/env"));
        unsafe { env::remove_var(DATA_ROOT_ENV) };
        assert_eq!(resolve_data_root(None), PathBuf::from(DEFAULT_DATA_ROOT));
    }

    #[test]
    fn load_indexes_complete_complexes_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fixture_dataset(dir.path(), "pdbbind_filtered");

        let index = DatasetIndex::load(dir.path(), "pdbbind_filtered").unwrap();
        assert_eq!(index.len(), 2);
        let ids: Vec<_> = index.complexes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1abc", "2xyz"]);
    }

    #[test]
    fn truncate_limits_the_index() {
        let dir = tempfile::tempdir().unwrap();
        fixture_dataset(dir.path(), "pdbbind_filtered");

        let mut index = DatasetIndex::load(dir.path(), "pdbbind_filtered").unwrap();
        index.truncate(1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.complexes[0].id, "1abc");
    }

    #[test]
    fn missing_root_and_dataset_are_reported_as_not_found() {
        let err = DatasetIndex::load(Path::new("/no/such/root"), "pdbbind_filtered").unwrap_err();
        assert!(err.to_string().contains("not found"));

        let dir = tempfile::tempdir().unwrap();
        let err = DatasetIndex::load(dir.path(), "pdbbind_filtered").unwrap_err();
        assert!(matches!(err, DatasetError::NotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn dataset_with_only_incomplete_complexes_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let test_dir = dir.path().join("broken").join("test");
        fs::create_dir_all(&test_dir).unwrap();
        write_complex(&test_dir, "1abc", false);

        let err = DatasetIndex::load(dir.path(), "broken").unwrap_err();
        assert!(matches!(err, DatasetError::EmptySplit { split: "test", .. }));
    }

    #[test]
    fn split_counts_report_all_three_splits() {
        let dir = tempfile::tempdir().unwrap();
        fixture_dataset(dir.path(), "pdbbind_filtered");
        let train_dir = dir.path().join("pdbbind_filtered").join("train");
        fs::create_dir_all(train_dir.join("9zzz")).unwrap();

        let counts = split_counts(dir.path(), "pdbbind_filtered").unwrap();
        assert_eq!(counts, vec![("train", 1), ("val", 0), ("test", 3)]);
    }
}
