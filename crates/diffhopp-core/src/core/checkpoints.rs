//! Discovery, alias resolution, and classification of trained model
//! checkpoints.
//!
//! Checkpoints are opaque binary artifacts consumed by the external sampler;
//! this module only locates them and classifies them by naming convention.
//! Short aliases let users type `diffhopp` or `gvp` instead of the full
//! checkpoint file name.

use phf::phf_map;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maps user-facing checkpoint aliases to canonical checkpoint file names.
///
/// The bare architecture names and the historical `diffhopp` aliases all point
/// at the conditional variants, which are the models used in practice.
pub static CHECKPOINT_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "gvp" => "gvp_conditional.ckpt",
    "egnn" => "egnn_conditional.ckpt",
    "diffhopp" => "gvp_conditional.ckpt",
    "diffhopp-egnn" => "egnn_conditional.ckpt",
    "gvp_conditional" => "gvp_conditional.ckpt",
    "gvp_unconditional" => "gvp_unconditional.ckpt",
    "egnn_conditional" => "egnn_conditional.ckpt",
    "egnn_unconditional" => "egnn_unconditional.ckpt",
};

/// How a checkpoint was trained, inferred from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointKind {
    /// Conditioned on the pocket; samples ligands directly.
    Conditional,
    /// Unconditional; supports repaint-style inpainting around a kept fragment.
    Unconditional,
}

impl fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointKind::Conditional => f.write_str("conditional"),
            CheckpointKind::Unconditional => f.write_str("unconditional"),
        }
    }
}

/// A resolved, existing checkpoint on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// The checkpoint file stem (e.g., `gvp_conditional`).
    pub name: String,
    /// Absolute or caller-relative path to the `.ckpt` file.
    pub path: PathBuf,
    /// Size of the checkpoint file in bytes.
    pub size_bytes: u64,
    /// Trained-as classification inferred from the stem.
    pub kind: CheckpointKind,
}

impl Checkpoint {
    /// Returns `true` if the checkpoint can be used for repaint-style
    /// inpainting.
    pub fn is_repainting_compatible(&self) -> bool {
        self.kind == CheckpointKind::Unconditional
    }
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoints directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("no .ckpt files found in '{}'", .0.display())]
    NoCheckpoints(PathBuf),
    #[error("checkpoint file not found: {path}", path = path.display())]
    FileNotFound {
        path: PathBuf,
        /// Stems of the checkpoints that do exist, for error reporting.
        available: Vec<String>,
    },
    #[error("failed to read checkpoint metadata for '{path}': {source}", path = path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to scan checkpoints directory '{path}': {source}", path = path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Classifies a checkpoint stem by naming convention.
pub fn kind_of_stem(stem: &str) -> CheckpointKind {
    if stem.contains("unconditional") {
        CheckpointKind::Unconditional
    } else {
        CheckpointKind::Conditional
    }
}

/// Maps a user-supplied checkpoint name to a path, without touching the
/// filesystem.
///
/// Names ending in `.ckpt` are taken verbatim relative to `checkpoints_dir`;
/// known aliases resolve through [`CHECKPOINT_ALIASES`]; anything else is
/// assumed to be a file name inside the directory. Joining an absolute name
/// onto the directory leaves the absolute path intact.
pub fn resolve_name(name: &str, checkpoints_dir: &Path) -> PathBuf {
    if name.ends_with(".ckpt") {
        return checkpoints_dir.join(name);
    }
    match CHECKPOINT_ALIASES.get(name.to_lowercase().as_str()) {
        Some(file_name) => checkpoints_dir.join(file_name),
        None => checkpoints_dir.join(name),
    }
}

/// Lists the `.ckpt` files in `dir`, sorted by file name.
///
/// Fails if the directory does not exist or contains no checkpoints, so the
/// caller gets a diagnosable error before any external work starts.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, CheckpointError> {
    if !dir.is_dir() {
        return Err(CheckpointError::DirectoryNotFound(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| CheckpointError::Scan {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut checkpoints: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CheckpointError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "ckpt") {
            checkpoints.push(path);
        }
    }
    checkpoints.sort();

    if checkpoints.is_empty() {
        return Err(CheckpointError::NoCheckpoints(dir.to_path_buf()));
    }
    Ok(checkpoints)
}

fn stems(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_stem())
        .filter_map(|s| s.to_str())
        .map(|s| s.to_string())
        .collect()
}

fn load(path: PathBuf, available: Vec<String>) -> Result<Checkpoint, CheckpointError> {
    if !path.is_file() {
        return Err(CheckpointError::FileNotFound { path, available });
    }
    let metadata = fs::metadata(&path).map_err(|source| CheckpointError::Metadata {
        path: path.clone(),
        source,
    })?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let kind = kind_of_stem(&name);
    Ok(Checkpoint {
        name,
        path,
        size_bytes: metadata.len(),
        kind,
    })
}

/// Loads checkpoint metadata from an explicit file path.
pub fn inspect(path: &Path) -> Result<Checkpoint, CheckpointError> {
    load(path.to_path_buf(), Vec::new())
}

/// Resolves a user-supplied checkpoint name against a checkpoints directory.
///
/// Plain names and aliases are validated against the directory, which must
/// exist and contain at least one `.ckpt` file. Names carrying a path
/// separator are treated as explicit paths and bypass directory validation.
pub fn resolve(name: &str, checkpoints_dir: &Path) -> Result<Checkpoint, CheckpointError> {
    let as_path = Path::new(name);
    if as_path.is_absolute() || name.contains(std::path::MAIN_SEPARATOR) {
        return load(as_path.to_path_buf(), Vec::new());
    }

    let existing = discover(checkpoints_dir)?;
    let path = resolve_name(name, checkpoints_dir);
    load(path, stems(&existing))
}
