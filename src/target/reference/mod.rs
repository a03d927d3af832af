//! Symmetry-blocked data of a state-averaged configuration-interaction-singles calculation.

use std::fmt;

use derive_builder::Builder;
use itertools::Itertools;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::symmetry::PointGroup;


// ==================
// Struct definitions
// ==================

/// A structure holding the symmetry-blocked one-particle reduced density matrix of a
/// state-averaged CIS calculation on top of a closed-shell reference, together with the
/// molecular-orbital coefficients in which it is expressed.
///
/// All per-irrep quantities are ordered as in [`PointGroup::irrep_labels`].
#[derive(Builder, Clone, Debug, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct CisReference {
    /// The point group in which the orbitals are blocked.
    point_group: PointGroup,

    /// The number of doubly-occupied reference orbitals in each irrep.
    doccpi: Vec<usize>,

    /// The alpha-spin one-particle reduced density matrix in the molecular-orbital basis, one
    /// square block per irrep. Rows and columns run over occupied orbitals first, then
    /// virtual orbitals.
    density_blocks: Vec<Array2<f64>>,

    /// The molecular-orbital coefficient matrices, one per irrep. Each block has one row per
    /// symmetry-adapted basis function and one column per molecular orbital.
    coefficient_blocks: Vec<Array2<f64>>,

    /// The threshold for checking that the density blocks are symmetric.
    #[builder(default = "1e-7")]
    threshold: f64,
}

impl CisReferenceBuilder {
    fn validate(&self) -> Result<(), String> {
        let point_group = self
            .point_group
            .ok_or("No point group found.".to_string())?;
        let doccpi = self
            .doccpi
            .as_ref()
            .ok_or("No `doccpi` found.".to_string())?;
        let density_blocks = self
            .density_blocks
            .as_ref()
            .ok_or("No density blocks found.".to_string())?;
        let coefficient_blocks = self
            .coefficient_blocks
            .as_ref()
            .ok_or("No coefficient blocks found.".to_string())?;
        let thresh = self.threshold.unwrap_or(1e-7);

        let nirrep = point_group.n_irreps();
        if doccpi.len() != nirrep
            || density_blocks.len() != nirrep
            || coefficient_blocks.len() != nirrep
        {
            return Err(format!(
                "Point group {point_group} has {nirrep} irreps, but {} `doccpi` entries, {} density block(s) and {} coefficient block(s) were given.",
                doccpi.len(),
                density_blocks.len(),
                coefficient_blocks.len()
            ));
        }

        density_blocks
            .iter()
            .zip(coefficient_blocks.iter())
            .zip(doccpi.iter())
            .enumerate()
            .try_for_each(|(h, ((den, c), &docc))| {
                let label = point_group.irrep_label(h);
                let (nrows, ncols) = den.dim();
                if nrows != ncols {
                    return Err(format!(
                        "Density block of irrep {label} is not square: {nrows} × {ncols}."
                    ));
                }
                if docc > nrows {
                    return Err(format!(
                        "Irrep {label} has {docc} doubly-occupied orbitals but only {nrows} molecular orbitals."
                    ));
                }
                if c.ncols() != nrows {
                    return Err(format!(
                        "Coefficient block of irrep {label} has {} columns, but its density block spans {nrows} molecular orbitals.",
                        c.ncols()
                    ));
                }
                if den.iter().any(|x| !x.is_finite()) {
                    return Err(format!(
                        "Density block of irrep {label} contains non-finite entries."
                    ));
                }
                if c.iter().any(|x| !x.is_finite()) {
                    return Err(format!(
                        "Coefficient block of irrep {label} contains non-finite entries."
                    ));
                }
                let max_asym = (den - &den.t())
                    .iter()
                    .fold(0.0_f64, |acc, x| acc.max(x.abs()));
                if max_asym > thresh {
                    return Err(format!(
                        "Density block of irrep {label} is not symmetric (largest deviation {max_asym:.3e} > {thresh:.3e})."
                    ));
                }
                Ok(())
            })
    }
}

impl CisReference {
    /// Returns a builder to construct a new [`CisReference`].
    pub fn builder() -> CisReferenceBuilder {
        CisReferenceBuilder::default()
    }

    /// The point group in which the orbitals are blocked.
    pub fn point_group(&self) -> PointGroup {
        self.point_group
    }

    /// The number of irreps.
    pub fn nirrep(&self) -> usize {
        self.doccpi.len()
    }

    /// The number of doubly-occupied orbitals in each irrep.
    pub fn doccpi(&self) -> &[usize] {
        &self.doccpi
    }

    /// The number of molecular orbitals in each irrep.
    pub fn nmopi(&self) -> Vec<usize> {
        self.density_blocks.iter().map(|den| den.nrows()).collect()
    }

    /// The number of virtual orbitals in each irrep.
    pub fn nvirpi(&self) -> Vec<usize> {
        self.nmopi()
            .into_iter()
            .zip(self.doccpi.iter())
            .map(|(nmo, docc)| nmo - docc)
            .collect()
    }

    /// The number of symmetry-adapted basis functions in each irrep.
    pub fn nsopi(&self) -> Vec<usize> {
        self.coefficient_blocks.iter().map(|c| c.nrows()).collect()
    }

    /// The density blocks, one per irrep.
    pub fn density_blocks(&self) -> &[Array2<f64>] {
        &self.density_blocks
    }

    /// The coefficient blocks, one per irrep.
    pub fn coefficient_blocks(&self) -> &[Array2<f64>] {
        &self.coefficient_blocks
    }

    /// The number of alpha electrons described by the density, *i.e.* its trace.
    pub fn density_trace(&self) -> f64 {
        self.density_blocks.iter().map(|den| den.diag().sum()).sum()
    }
}

impl fmt::Display for CisReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self.point_group.irrep_labels();
        let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(1).max(4);
        writeln!(f, "Point group: {}", self.point_group)?;
        writeln!(
            f,
            "  {:<6} {}",
            "",
            labels.iter().map(|l| format!("{l:>width$}")).join(" ")
        )?;
        writeln!(
            f,
            "  {:<6} {}",
            "NSO",
            self.nsopi().iter().map(|n| format!("{n:>width$}")).join(" ")
        )?;
        writeln!(
            f,
            "  {:<6} {}",
            "NMO",
            self.nmopi().iter().map(|n| format!("{n:>width$}")).join(" ")
        )?;
        writeln!(
            f,
            "  {:<6} {}",
            "DOCC",
            self.doccpi.iter().map(|n| format!("{n:>width$}")).join(" ")
        )?;
        writeln!(f, "Trace of alpha density: {:.8}", self.density_trace())?;
        Ok(())
    }
}
