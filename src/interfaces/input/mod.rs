//! Configuration files for `cinoas`.

use std::path::PathBuf;

use anyhow::{self, bail, Context};
use serde::{Deserialize, Serialize};

use crate::drivers::active_space_selection::{
    ActiveSpaceSelectionDriver, ActiveSpaceSelectionParams,
};
use crate::drivers::natural_orbitals::{CinoDriver, CinoParams};
use crate::drivers::CinoasDriver;
use crate::interfaces::binaries::BinariesCisSource;
use crate::interfaces::npy::NpyCisSource;
use crate::interfaces::InputHandle;
use crate::io::format::{cinoas_output, cinoas_warn, log_title};
use crate::io::{read_cinoas_binary, CinoasFileType};
use crate::target::natural_orbitals::NaturalOrbitals;
use crate::target::reference::CisReference;


// =================
// Trait definitions
// =================

/// Trait for sources from which a [`CisReference`] can be acquired.
pub trait CisReferenceSourceHandle {
    /// Reads in the symmetry-blocked CIS density and reference orbitals.
    fn cis_reference(&self) -> Result<CisReference, anyhow::Error>;
}

// ==================
// Struct definitions
// ==================

/// An enumerated type representing possible sources of the CIS density and reference orbitals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CisReferenceSource {
    /// Variant for raw binary files of `f64` values.
    Binaries(BinariesCisSource),

    /// Variant for NumPy `.npy` files.
    Npy(NpyCisSource),
}

impl Default for CisReferenceSource {
    fn default() -> Self {
        CisReferenceSource::Binaries(BinariesCisSource::default())
    }
}

impl CisReferenceSourceHandle for CisReferenceSource {
    fn cis_reference(&self) -> Result<CisReference, anyhow::Error> {
        match self {
            CisReferenceSource::Binaries(source) => source.cis_reference(),
            CisReferenceSource::Npy(source) => source.cis_reference(),
        }
    }
}

/// An enumerated type representing possible input kinds for CIS natural orbitals from a YAML
/// input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum NaturalOrbitalsInputKind {
    /// Variant indicating that the natural orbitals are to be constructed from the CIS
    /// reference using the associated parameters.
    Parameters(CinoParams),

    /// Variant indicating that the natural orbitals will be read in from a `cinoas`
    /// [`CinoasFileType::Cino`] binary file. The associated path gives the name of the file
    /// without its `.cinoas.cino` extension.
    FromFile(PathBuf),
}

impl Default for NaturalOrbitalsInputKind {
    fn default() -> Self {
        NaturalOrbitalsInputKind::Parameters(CinoParams::default())
    }
}

/// A structure containing `cinoas` input parameters which can be serialised into and
/// deserialised from a YAML input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Input {
    /// The source of the CIS density and reference orbitals. This is required unless the
    /// natural orbitals are read in from file.
    #[serde(default)]
    pub source: Option<CisReferenceSource>,

    /// Specification for obtaining the CIS natural orbitals.
    #[serde(default)]
    pub natural_orbitals: NaturalOrbitalsInputKind,

    /// Parameters for active-space selection.
    #[serde(default)]
    pub active_space: ActiveSpaceSelectionParams,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            source: Some(CisReferenceSource::default()),
            natural_orbitals: NaturalOrbitalsInputKind::default(),
            active_space: ActiveSpaceSelectionParams::default(),
        }
    }
}

impl Input {
    /// Obtains the CIS natural orbitals as specified by the input.
    fn natural_orbitals(&self) -> Result<NaturalOrbitals, anyhow::Error> {
        match &self.natural_orbitals {
            NaturalOrbitalsInputKind::Parameters(cino_params) => {
                let Some(source) = self.source.as_ref() else {
                    bail!("No CIS reference source specified for the construction of natural orbitals.");
                };
                let reference = source
                    .cis_reference()
                    .with_context(|| "Unable to acquire the CIS reference")?;
                let mut cino_driver = CinoDriver::builder()
                    .parameters(cino_params)
                    .reference(&reference)
                    .build()?;
                cino_driver.run()?;
                cino_driver.result().cloned()
            }
            NaturalOrbitalsInputKind::FromFile(name) => {
                if self.source.is_some() {
                    cinoas_warn!(
                        "Natural orbitals are read in from file; the CIS reference source will be ignored."
                    );
                }
                let path = CinoasFileType::Cino.path(name);
                log_title(&format!("CIS Natural Orbitals from {}", path.display()));
                cinoas_output!("");
                read_cinoas_binary(name, CinoasFileType::Cino).with_context(|| {
                    format!("Unable to read natural orbitals from `{}`", path.display())
                })
            }
        }
    }
}

impl InputHandle for Input {
    /// Handles the `cinoas` input: acquires the CIS natural orbitals and selects an active
    /// space from their occupations.
    fn handle(&self) -> Result<(), anyhow::Error> {
        let nos = self.natural_orbitals()?;
        let mut act_driver = ActiveSpaceSelectionDriver::builder()
            .parameters(&self.active_space)
            .natural_orbitals(&nos)
            .build()?;
        act_driver.run()
    }
}
