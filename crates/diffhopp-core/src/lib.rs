//! # DiffHopp Core Library
//!
//! An orchestration and evaluation library for diffusion-based scaffold hopping,
//! wrapping externally trained generative models and docking engines behind a
//! uniform, strongly typed pipeline.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Molecule`,
//!   `MoleculeSet`, `ResultSet`), file parsers for the SDF and PDBQT formats,
//!   checkpoint discovery and alias resolution, dataset indexing, and the
//!   connectivity metrics used to diagnose generated structures.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates external
//!   processes. It includes the tool invocation machinery (`ToolCommand`) with
//!   wall-clock timeouts, the docking engine adapters (gnina, QuickVina, AutoDock-GPU),
//!   receptor/ligand preparation with graceful fallbacks, and report bundle management.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer.
//!   It ties the `engine` and `core` together to execute complete procedures: checkpoint
//!   evaluation, training and generation passthrough, connectivity diagnosis, and
//!   environment health checks. It provides a simple and powerful entry point for
//!   end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
