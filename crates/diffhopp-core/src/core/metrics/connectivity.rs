use crate::core::models::molecule::Molecule;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Distance below which two atoms are considered "close" regardless of whether
/// a bond was written for them, in Angstroms.
pub const CLOSE_PAIR_CUTOFF: f64 = 2.0;

/// Connectivity ratio below which a molecule is flagged as poorly connected.
pub const POOR_RATIO_THRESHOLD: f64 = 0.5;

/// Connectivity ratio above which a molecule is considered well connected.
pub const GOOD_RATIO_THRESHOLD: f64 = 0.8;

/// Structural connectivity statistics for a single molecule.
///
/// The connectivity ratio compares the written bond count against the minimum
/// needed to span all atoms (`atoms - 1`): a ratio near zero means the file
/// describes a point cloud rather than a molecule, while values at or above
/// one indicate a properly bonded (possibly cyclic) graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    /// Total number of atoms.
    pub num_atoms: usize,
    /// Total number of bonds written in the file.
    pub num_bonds: usize,
    /// Number of atom pairs closer than [`CLOSE_PAIR_CUTOFF`].
    pub close_pairs: usize,
    /// `num_bonds / max(num_atoms - 1, 1)`.
    pub connectivity_ratio: f64,
    /// Smallest pairwise interatomic distance, if the molecule has two or more atoms.
    pub min_distance: Option<f64>,
    /// Mean pairwise interatomic distance, if the molecule has two or more atoms.
    pub mean_distance: Option<f64>,
}

impl ConnectivityReport {
    /// Computes the connectivity statistics of `molecule`.
    pub fn of(molecule: &Molecule) -> Self {
        let num_atoms = molecule.num_atoms();
        let num_bonds = molecule.num_bonds();

        let mut close_pairs = 0;
        let mut min_distance = f64::INFINITY;
        let mut sum_distance = 0.0;
        let mut pair_count = 0usize;

        for (a, b) in molecule.atoms.iter().tuple_combinations() {
            let distance = (a.position - b.position).norm();
            if distance < CLOSE_PAIR_CUTOFF {
                close_pairs += 1;
            }
            if distance < min_distance {
                min_distance = distance;
            }
            sum_distance += distance;
            pair_count += 1;
        }

        let connectivity_ratio = num_bonds as f64 / (num_atoms.max(2) - 1) as f64;

        Self {
            num_atoms,
            num_bonds,
            close_pairs,
            connectivity_ratio,
            min_distance: (pair_count > 0).then_some(min_distance),
            mean_distance: (pair_count > 0).then(|| sum_distance / pair_count as f64),
        }
    }

    /// Returns `true` if the file wrote no bonds at all.
    pub fn is_disconnected(&self) -> bool {
        self.num_bonds == 0
    }

    /// Returns `true` if the connectivity ratio falls below
    /// [`POOR_RATIO_THRESHOLD`].
    pub fn is_poorly_connected(&self) -> bool {
        self.connectivity_ratio < POOR_RATIO_THRESHOLD
    }
}

/// Aggregate connectivity statistics over a batch of molecules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivitySummary {
    /// Number of molecules analyzed.
    pub total: usize,
    /// Molecules with zero bonds.
    pub zero_bond_count: usize,
    /// Molecules with a connectivity ratio below [`POOR_RATIO_THRESHOLD`].
    pub poorly_connected: usize,
    /// Molecules with a connectivity ratio above [`GOOD_RATIO_THRESHOLD`].
    pub well_connected: usize,
    /// Mean bond count per molecule.
    pub mean_bonds: f64,
    /// Population standard deviation of the bond count.
    pub std_bonds: f64,
    /// Mean connectivity ratio.
    pub mean_ratio: f64,
    /// Population standard deviation of the connectivity ratio.
    pub std_ratio: f64,
}

impl ConnectivitySummary {
    /// Aggregates a batch of per-molecule reports, or returns `None` for an
    /// empty batch.
    pub fn from_reports(reports: &[ConnectivityReport]) -> Option<Self> {
        if reports.is_empty() {
            return None;
        }

        let bonds: Vec<f64> = reports.iter().map(|r| r.num_bonds as f64).collect();
        let ratios: Vec<f64> = reports.iter().map(|r| r.connectivity_ratio).collect();
        let (mean_bonds, std_bonds) = mean_and_std(&bonds);
        let (mean_ratio, std_ratio) = mean_and_std(&ratios);

        Some(Self {
            total: reports.len(),
            zero_bond_count: reports.iter().filter(|r| r.is_disconnected()).count(),
            poorly_connected: reports.iter().filter(|r| r.is_poorly_connected()).count(),
            well_connected: reports
                .iter()
                .filter(|r| r.connectivity_ratio > GOOD_RATIO_THRESHOLD)
                .count(),
            mean_bonds,
            std_bonds,
            mean_ratio,
            std_ratio,
        })
    }
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
