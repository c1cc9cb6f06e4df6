//! # Engine Module
//!
//! This module implements the orchestration layer of the pipeline: everything
//! that touches processes, the filesystem, or run state, built on top of the
//! stateless [`crate::core`] layer.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different
//! aspects of a run:
//!
//! - **Configuration** ([`config`]) - Validated run parameters built through builders
//! - **Tool Execution** ([`exec`]) - External command invocation, timeouts, `PATH` lookup
//! - **Molecule Generation** ([`generation`]) - Sampler invocations and ground-truth snapshots
//! - **Docking Scorers** ([`scoring`]) - gnina, QuickVina, and AutoDock-GPU adapters
//! - **Report Bundles** ([`report`]) - Output directory layout, CSV/HTML/summary rendering
//! - **Progress Monitoring** ([`progress`]) - Progress reporting and user feedback mechanisms
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation

pub mod config;
pub mod error;
pub mod exec;
pub mod generation;
pub mod progress;
pub mod report;
pub mod scoring;
