//! `cinoas` interface with NumPy `.npy` files.

use std::path::PathBuf;

use anyhow::{self, bail, format_err, Context};
use derive_builder::Builder;
use ndarray::Array2;
use ndarray_npy::read_npy;
use serde::{Deserialize, Serialize};

use crate::interfaces::input::CisReferenceSourceHandle;
use crate::symmetry::PointGroup;
use crate::target::reference::CisReference;


/// Serialisable/deserialisable structure containing control parameters for acquiring the
/// symmetry-blocked CIS density and reference orbitals from two-dimensional `f64` `.npy` arrays,
/// such as those saved from Psi4's `wfn.Da_subset("MO").nph` and `wfn.Ca().nph`.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct NpyCisSource {
    /// The point group in which the orbitals are blocked.
    pub point_group: PointGroup,

    /// The number of doubly-occupied reference orbitals in each irrep.
    pub doccpi: Vec<usize>,

    /// Paths to `.npy` files containing the molecular-orbital-basis alpha density blocks, one
    /// per irrep.
    pub densities: Vec<PathBuf>,

    /// Paths to `.npy` files containing the molecular-orbital coefficient blocks, one per irrep.
    pub coefficients: Vec<PathBuf>,
}

impl NpyCisSource {
    /// Returns a builder to construct a structure for handling npy CIS source.
    pub fn builder() -> NpyCisSourceBuilder {
        NpyCisSourceBuilder::default()
    }
}

/// Reads a two-dimensional `f64` array from an `.npy` file.
fn read_block(path: &PathBuf) -> Result<Array2<f64>, anyhow::Error> {
    read_npy::<_, Array2<f64>>(path)
        .map_err(|err| format_err!(err))
        .with_context(|| format!("Unable to read `{}`", path.display()))
}

impl CisReferenceSourceHandle for NpyCisSource {
    fn cis_reference(&self) -> Result<CisReference, anyhow::Error> {
        let nirrep = self.point_group.n_irreps();
        if self.densities.len() != nirrep || self.coefficients.len() != nirrep {
            bail!(
                "Point group {} has {nirrep} irreps, but {} density file(s) and {} coefficient file(s) were given.",
                self.point_group,
                self.densities.len(),
                self.coefficients.len()
            );
        }
        let density_blocks = self
            .densities
            .iter()
            .map(read_block)
            .collect::<Result<Vec<_>, _>>()?;
        let coefficient_blocks = self
            .coefficients
            .iter()
            .map(read_block)
            .collect::<Result<Vec<_>, _>>()?;

        CisReference::builder()
            .point_group(self.point_group)
            .doccpi(self.doccpi.clone())
            .density_blocks(density_blocks)
            .coefficient_blocks(coefficient_blocks)
            .build()
            .with_context(|| "Unable to construct a CIS reference when handling npy CIS source")
    }
}
