//! # Metrics Module
//!
//! Pure structural quality metrics for generated molecules. The only family
//! implemented natively is connectivity analysis, which catches the most common
//! failure mode of 3D generative models: atom clouds that no longer form a
//! single bonded graph.

pub mod connectivity;
