//! # Core I/O Module
//!
//! Readers and writers for the molecular file formats the pipeline touches
//! directly: SDF (V2000) for generated molecules and reference ligands, and
//! PDBQT for docking inputs prepared by external tools.
//!
//! Protein PDB files are never parsed here; they are only handed to external
//! programs by path.

pub mod pdbqt;
pub mod sdf;
pub mod traits;
