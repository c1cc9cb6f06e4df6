//! # Workflows Module
//!
//! This module provides the high-level entry points that orchestrate complete
//! DiffHopp pipelines over checkpoints, datasets, and external tools.
//!
//! ## Overview
//!
//! Workflows are the top-level API of the library. Each one validates its
//! inputs, drives the engine layer from start to finish, reports progress
//! through a [`ProgressReporter`](crate::engine::progress::ProgressReporter),
//! and persists its artifacts under the documented bundle layout. The CLI is
//! a thin shell over these functions.
//!
//! ## Architecture
//!
//! The module is organized around the pipeline surfaces:
//!
//! - **Evaluation** ([`evaluate`]) - Samples molecules for every test pocket
//!   of a dataset and scores them with the configured docking engine.
//! - **Training** ([`train`]) - Forwards a validated hyperparameter set to
//!   the external trainer and streams its output.
//! - **Generation** ([`generate`]) - Samples molecules for a single
//!   protein-ligand pair outside any dataset.
//! - **Diagnosis** ([`diagnose`]) - Re-measures structure metrics over a
//!   directory of previously generated molecules.
//! - **Environment checks** ([`doctor`]) - Verifies the external tool stack
//!   before a long run is attempted.

pub mod diagnose;
pub mod doctor;
pub mod evaluate;
pub mod generate;
pub mod train;
