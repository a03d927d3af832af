//! Natural orbitals of the state-averaged CIS density, obtained by block-diagonalising its
//! occupied–occupied and virtual–virtual blocks within each irrep.

use std::fmt;

use anyhow::{self, format_err};
use itertools::Itertools;
use log;
use nalgebra::DMatrix;
use ndarray::{concatenate, s, Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::io::format::write_subtitle;
use crate::symmetry::PointGroup;
use crate::target::reference::CisReference;


/// Convergence threshold for the symmetric eigensolver.
const EIGEN_EPSILON: f64 = 1e-14;

/// Maximum number of implicit QR iterations for the symmetric eigensolver.
const EIGEN_MAX_ITERATIONS: usize = 100_000;

// ==================
// Struct definitions
// ==================

/// The two diagonal blocks of the density within one irrep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitalBlock {
    Occupied,
    Virtual,
}

impl fmt::Display for OrbitalBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitalBlock::Occupied => write!(f, "occupied"),
            OrbitalBlock::Virtual => write!(f, "virtual"),
        }
    }
}

/// CIS natural orbitals (CINOs) and their occupation numbers, blocked by irrep.
///
/// Within each irrep, the occupied CINOs are rotations among the occupied reference orbitals
/// only, and likewise for the virtual CINOs, so that the occupied/virtual partitioning of the
/// reference is preserved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NaturalOrbitals {
    /// The point group in which the orbitals are blocked.
    point_group: PointGroup,

    /// The number of doubly-occupied reference orbitals in each irrep.
    doccpi: Vec<usize>,

    /// The occupation numbers of the occupied CINOs in each irrep, in descending order.
    occupied_occupations: Vec<Array1<f64>>,

    /// The occupation numbers of the virtual CINOs in each irrep, in descending order.
    virtual_occupations: Vec<Array1<f64>>,

    /// The orthogonal matrices rotating the occupied reference orbitals into the occupied CINOs.
    occupied_rotations: Vec<Array2<f64>>,

    /// The orthogonal matrices rotating the virtual reference orbitals into the virtual CINOs.
    virtual_rotations: Vec<Array2<f64>>,

    /// The CINO coefficient matrices in each irrep, occupied CINOs first.
    coefficients: Vec<Array2<f64>>,
}

impl NaturalOrbitals {
    /// Block-diagonalises the occupied–occupied and virtual–virtual blocks of the density in
    /// each irrep and rotates the reference orbitals accordingly.
    ///
    /// If $`\mathbf{U}`$ diagonalises a block such that
    /// $`\mathbf{U}^{\mathsf{T}} \mathbf{D} \mathbf{U} = \mathrm{diag}(n_1, n_2, \ldots)`$ with
    /// $`n_1 \geq n_2 \geq \ldots`$, the corresponding CINO coefficients are
    /// $`\mathbf{C}\mathbf{U}`$ where $`\mathbf{C}`$ contains the columns of the reference
    /// coefficient matrix belonging to that block.
    ///
    /// # Arguments
    ///
    /// * `reference` - The symmetry-blocked CIS density and reference orbitals.
    ///
    /// # Errors
    ///
    /// Errors if the eigensolver fails to converge for any block.
    pub fn from_reference(reference: &CisReference) -> Result<Self, anyhow::Error> {
        let point_group = reference.point_group();
        let blocks = reference
            .density_blocks()
            .par_iter()
            .zip(reference.coefficient_blocks().par_iter())
            .zip(reference.doccpi().par_iter())
            .enumerate()
            .map(|(h, ((den, c), &docc))| {
                let label = point_group.irrep_label(h);
                let (occs_o, u_o) = diagonalise_descending(
                    den.slice(s![..docc, ..docc]),
                )
                .map_err(|err| {
                    format_err!("{err} (irrep {label}, {} block)", OrbitalBlock::Occupied)
                })?;
                let (occs_v, u_v) = diagonalise_descending(
                    den.slice(s![docc.., docc..]),
                )
                .map_err(|err| {
                    format_err!("{err} (irrep {label}, {} block)", OrbitalBlock::Virtual)
                })?;
                let c_o = c.slice(s![.., ..docc]).dot(&u_o);
                let c_v = c.slice(s![.., docc..]).dot(&u_v);
                let c_no = concatenate(Axis(1), &[c_o.view(), c_v.view()])?;
                log::debug!(
                    "Irrep {label}: {} occupied and {} virtual CINOs constructed.",
                    occs_o.len(),
                    occs_v.len()
                );
                Ok::<_, anyhow::Error>((occs_o, occs_v, u_o, u_v, c_no))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (mut occupied_occupations, mut virtual_occupations) = (vec![], vec![]);
        let (mut occupied_rotations, mut virtual_rotations) = (vec![], vec![]);
        let mut coefficients = vec![];
        for (occs_o, occs_v, u_o, u_v, c_no) in blocks {
            occupied_occupations.push(occs_o);
            virtual_occupations.push(occs_v);
            occupied_rotations.push(u_o);
            virtual_rotations.push(u_v);
            coefficients.push(c_no);
        }

        Ok(Self {
            point_group,
            doccpi: reference.doccpi().to_vec(),
            occupied_occupations,
            virtual_occupations,
            occupied_rotations,
            virtual_rotations,
            coefficients,
        })
    }

    /// The point group in which the orbitals are blocked.
    pub fn point_group(&self) -> PointGroup {
        self.point_group
    }

    /// The number of doubly-occupied reference orbitals in each irrep.
    pub fn doccpi(&self) -> &[usize] {
        &self.doccpi
    }

    /// The number of virtual orbitals in each irrep.
    pub fn nvirpi(&self) -> Vec<usize> {
        self.virtual_occupations.iter().map(|v| v.len()).collect()
    }

    /// The occupation numbers of the occupied CINOs in each irrep, in descending order.
    pub fn occupied_occupations(&self) -> &[Array1<f64>] {
        &self.occupied_occupations
    }

    /// The occupation numbers of the virtual CINOs in each irrep, in descending order.
    pub fn virtual_occupations(&self) -> &[Array1<f64>] {
        &self.virtual_occupations
    }

    /// The eigenvectors of the occupied–occupied density blocks, one per irrep.
    pub fn occupied_rotations(&self) -> &[Array2<f64>] {
        &self.occupied_rotations
    }

    /// The eigenvectors of the virtual–virtual density blocks, one per irrep.
    pub fn virtual_rotations(&self) -> &[Array2<f64>] {
        &self.virtual_rotations
    }

    /// The CINO coefficient matrices, one per irrep.
    pub fn coefficients(&self) -> &[Array2<f64>] {
        &self.coefficients
    }

    /// Returns the occupation numbers of all CINOs of irrep `h`, occupied ones first.
    pub fn flattened_occupations(&self, h: usize) -> Option<Array1<f64>> {
        let occ = self.occupied_occupations.get(h)?;
        let vir = self.virtual_occupations.get(h)?;
        concatenate(Axis(0), &[occ.view(), vir.view()]).ok()
    }

    /// The total alpha occupation over all CINOs, which equals the trace of the density.
    pub fn n_electrons_alpha(&self) -> f64 {
        self.occupied_occupations
            .iter()
            .chain(self.virtual_occupations.iter())
            .map(|occs| occs.sum())
            .sum()
    }
}

impl fmt::Display for NaturalOrbitals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "CIS natural-orbital occupations")?;
        writeln!(f)?;
        writeln!(f, "{}", "┈".repeat(40))?;
        writeln!(f, "{:>6} {:>9} {:>5} {:>16}", "Irrep", "Block", "#", "Occupation")?;
        writeln!(f, "{}", "┈".repeat(40))?;
        self.occupied_occupations
            .iter()
            .zip(self.virtual_occupations.iter())
            .enumerate()
            .try_for_each(|(h, (occs_o, occs_v))| {
                let label = self.point_group.irrep_label(h);
                occs_o
                    .iter()
                    .map(|n| (OrbitalBlock::Occupied, n))
                    .chain(occs_v.iter().map(|n| (OrbitalBlock::Virtual, n)))
                    .enumerate()
                    .try_for_each(|(i, (block, n))| {
                        writeln!(f, "{label:>6} {:>9} {i:>5} {n:>16.10}", block.to_string())
                    })
            })?;
        writeln!(f, "{}", "┈".repeat(40))?;
        writeln!(
            f,
            "Per irrep (occ/vir): {}",
            self.occupied_occupations
                .iter()
                .zip(self.virtual_occupations.iter())
                .enumerate()
                .map(|(h, (o, v))| format!(
                    "{} {}/{}",
                    self.point_group.irrep_label(h),
                    o.len(),
                    v.len()
                ))
                .join(", ")
        )?;
        writeln!(f, "Total alpha occupation: {:.10}", self.n_electrons_alpha())?;
        Ok(())
    }
}

// =========
// Functions
// =========

/// Diagonalises a real symmetric block and returns its eigenvalues in descending order together
/// with the correspondingly ordered eigenvectors as columns.
///
/// Each eigenvector is fixed in sign such that its component of largest magnitude is positive.
fn diagonalise_descending(
    block: ArrayView2<f64>,
) -> Result<(Array1<f64>, Array2<f64>), anyhow::Error> {
    let n = block.nrows();
    if n == 0 {
        return Ok((Array1::zeros(0), Array2::zeros((0, 0))));
    }
    let mat = DMatrix::from_fn(n, n, |i, j| block[[i, j]]);
    let eig = mat
        .try_symmetric_eigen(EIGEN_EPSILON, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| format_err!("Symmetric eigensolver failed to converge"))?;

    let order = (0..n)
        .sorted_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]))
        .collect_vec();
    let eigvals = order.iter().map(|&k| eig.eigenvalues[k]).collect::<Array1<f64>>();
    let mut eigvecs = Array2::from_shape_fn((n, n), |(i, j)| eig.eigenvectors[(i, order[j])]);
    eigvecs.columns_mut().into_iter().for_each(|mut col| {
        let pivot = col
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        if pivot < 0.0 {
            col.mapv_inplace(|x| -x);
        }
    });
    Ok((eigvals, eigvecs))
}
