//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent molecules,
//! protein-ligand complexes, and evaluation artifacts throughout the pipeline.
//!
//! ## Key Components
//!
//! - [`molecule`] - In-memory molecular graph with 3D coordinates and bonds
//! - [`complex`] - A protein pocket paired with its reference ligand on disk
//! - [`record`] - Manifest records tying generated molecules to their provenance,
//!   plus the scored result sets produced by the evaluation stage

pub mod complex;
pub mod molecule;
pub mod record;
