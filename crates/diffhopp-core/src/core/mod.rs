//! # Core Module
//!
//! This module provides the fundamental building blocks for the DiffHopp evaluation
//! pipeline, serving as the stateless foundation of the library.
//!
//! ## Overview
//!
//! The core module implements the data structures, parsers, and pure computations
//! that every higher layer builds on. Nothing in this module spawns a process or
//! mutates global state; everything is deterministic and unit-testable in isolation.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different aspects
//! of the pipeline's data plane:
//!
//! - **Molecular Representation** ([`models`]) - Molecules, protein-ligand complexes, and manifest records
//! - **File I/O** ([`io`]) - Reading/writing the SDF (V2000) and PDBQT formats
//! - **Structure Diagnostics** ([`metrics`]) - Connectivity statistics for generated molecules
//! - **Checkpoint Management** ([`checkpoints`]) - Discovery, alias resolution, and classification of model checkpoints
//! - **Dataset Indexing** ([`dataset`]) - Locating processed protein-ligand test sets on disk

pub mod checkpoints;
pub mod dataset;
pub mod io;
pub mod metrics;
pub mod models;
