//! `cinoas` interface with Psi4.
//!
//! This covers both ends of a calculation: generating the Psi4 input for the state-averaged
//! CIS run that produces the density, and rendering the selected active space as Psi4
//! `restricted_docc`/`active`/`restricted_uocc` options for a subsequent CASSCF run.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{self, bail, format_err, Context};
use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::interfaces::InputHandle;
use crate::io::format::cinoas_output;
use crate::target::active_space::ActiveSpace;

#[cfg(test)]
#[path = "psi4_tests.rs"]
mod psi4_tests;

/// The name of the Psi4 executable.
const PSI4_EXECUTABLE: &str = "psi4";

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// State-averaged CIS input
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A structure containing the ingredients of a Psi4 input file for a state-averaged CIS
/// calculation whose one-particle density is used for active-space selection.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Psi4CisInput {
    /// The body of the Psi4 `molecule` block.
    #[builder(setter(into))]
    pub geometry: String,

    /// The orbital basis set.
    #[builder(setter(into), default = "\"cc-pVDZ\".to_string()")]
    #[serde(default = "default_basis")]
    pub basis: String,

    /// The number of CIS roots.
    pub num_roots: usize,

    /// The indices of the roots over which the density is averaged.
    pub avg_states: Vec<usize>,

    /// The energy convergence exponent, such that the energy is converged to $`10^{-n}`$.
    #[builder(default = "10")]
    #[serde(default = "default_e_convergence")]
    pub e_convergence: u32,

    /// Optional stem for exporting the MO-basis alpha density blocks and the MO coefficient
    /// blocks as `.npy` files, one per irrep, in the layout read by the npy interface. If
    /// `None`, only the wavefunction file is written.
    #[builder(setter(into, strip_option), default = "None")]
    #[serde(default)]
    pub npy_export_stem: Option<String>,
}

fn default_basis() -> String {
    "cc-pVDZ".to_string()
}

fn default_e_convergence() -> u32 {
    10
}

fn check_roots(num_roots: usize, avg_states: &[usize]) -> Result<(), String> {
    if num_roots == 0 {
        return Err("At least one CIS root is required.".to_string());
    }
    if avg_states.is_empty() {
        return Err("At least one state must be averaged.".to_string());
    }
    if let Some(state) = avg_states.iter().find(|&&state| state >= num_roots) {
        return Err(format!(
            "Averaged state {state} does not exist with {num_roots} root(s)."
        ));
    }
    Ok(())
}

impl Psi4CisInputBuilder {
    fn validate(&self) -> Result<(), String> {
        let num_roots = self.num_roots.ok_or("No number of roots found.".to_string())?;
        let avg_states = self
            .avg_states
            .as_ref()
            .ok_or("No averaged states found.".to_string())?;
        check_roots(num_roots, avg_states)
    }
}

impl Psi4CisInput {
    /// Returns a builder to construct a [`Psi4CisInput`] structure.
    pub fn builder() -> Psi4CisInputBuilder {
        Psi4CisInputBuilder::default()
    }

    /// Checks the root settings of an input that did not go through the builder, such as one
    /// deserialised from YAML.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        check_roots(self.num_roots, &self.avg_states).map_err(|err| format_err!(err))
    }

    /// Writes the Psi4 input file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let mut writer = BufWriter::new(File::create(path.as_ref()).with_context(|| {
            format!(
                "Unable to create Psi4 input file `{}`",
                path.as_ref().display()
            )
        })?);
        write!(writer, "{self}")?;
        writer.flush()?;
        log::debug!("Psi4 input written to {}.", path.as_ref().display());
        Ok(())
    }

    /// Writes the Psi4 input file and runs Psi4 on it.
    ///
    /// # Errors
    ///
    /// Errors if the input cannot be written, if Psi4 cannot be launched, or if Psi4 exits with
    /// a non-zero status.
    pub fn execute<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        self.write(&path)?;
        log::info!("Running {PSI4_EXECUTABLE} on {}.", path.as_ref().display());
        let status = Command::new(PSI4_EXECUTABLE)
            .arg(path.as_ref())
            .status()
            .map_err(|err| format_err!("Unable to launch `{PSI4_EXECUTABLE}`: {err}"))?;
        if !status.success() {
            bail!(
                "`{PSI4_EXECUTABLE}` exited unsuccessfully on `{}` ({status}).",
                path.as_ref().display()
            );
        }
        Ok(())
    }
}

/// A standalone job that writes a Psi4 state-averaged CIS input file and optionally runs Psi4
/// on it. This is read from its own YAML file by `cinoas --psi4-cis`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Psi4CisJob {
    /// The ingredients of the Psi4 input.
    pub input: Psi4CisInput,

    /// The path of the Psi4 input file to be written.
    pub input_file: PathBuf,

    /// Whether Psi4 is run on the written input.
    #[serde(default)]
    pub execute: bool,
}

impl InputHandle for Psi4CisJob {
    fn handle(&self) -> Result<(), anyhow::Error> {
        self.input
            .validate()
            .with_context(|| "Invalid Psi4 CIS input")?;
        if self.execute {
            self.input.execute(&self.input_file)
        } else {
            self.input.write(&self.input_file)?;
            cinoas_output!(
                "Psi4 CIS input written to {}; run `{PSI4_EXECUTABLE}` on it to produce the density.",
                self.input_file.display()
            );
            Ok(())
        }
    }
}

impl fmt::Display for Psi4CisInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "molecule {{")?;
        writeln!(f, "{}", self.geometry.trim_end())?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "set {{")?;
        writeln!(f, "    basis                   {}", self.basis)?;
        writeln!(f, "    scf_type                df")?;
        writeln!(f, "    reference               rhf")?;
        writeln!(f, "    e_convergence           {}", self.e_convergence)?;
        writeln!(f, "    ex_level                1     # run CIS")?;
        writeln!(f, "    opdm                    true  # return one-particle density matrix")?;
        writeln!(f, "    num_roots               {}", self.num_roots)?;
        writeln!(
            f,
            "    avg_states              [{}]",
            self.avg_states.iter().join(", ")
        )?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "e, wfn = psi4.energy(\"detci\", return_wfn=True)")?;
        writeln!(f, "wfn.to_file(\"wfn.npy\")")?;
        if let Some(stem) = self.npy_export_stem.as_ref() {
            writeln!(f)?;
            writeln!(f, "import numpy as np")?;
            writeln!(f, "da = wfn.Da_subset(\"MO\")")?;
            writeln!(f, "ca = wfn.Ca()")?;
            writeln!(f, "print(\"doccpi:\", list(wfn.doccpi().to_tuple()))")?;
            writeln!(f, "for h in range(wfn.nirrep()):")?;
            writeln!(f, "    np.save(f\"{stem}.density.irrep{{h}}.npy\", da.nph[h])")?;
            writeln!(f, "    np.save(f\"{stem}.coefficients.irrep{{h}}.npy\", ca.nph[h])")?;
        }
        Ok(())
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~
// Active-space options
// ~~~~~~~~~~~~~~~~~~~~~~

/// A structure containing Psi4 orbital-space options for a selected active space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psi4ActiveSpaceOptions {
    /// The number of doubly-occupied orbitals outside the active space in each irrep.
    pub restricted_docc: Vec<usize>,

    /// The number of active orbitals in each irrep.
    pub active: Vec<usize>,

    /// The number of unoccupied orbitals outside the active space in each irrep.
    pub restricted_uocc: Vec<usize>,

    /// The number of active electrons.
    pub n_active_electrons: usize,
}

impl Psi4ActiveSpaceOptions {
    /// Writes the options as a Psi4 `set` block into a file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let mut writer = BufWriter::new(File::create(path.as_ref()).with_context(|| {
            format!(
                "Unable to create Psi4 options file `{}`",
                path.as_ref().display()
            )
        })?);
        write!(writer, "{self}")?;
        writer.flush()?;
        Ok(())
    }
}

impl From<&ActiveSpace> for Psi4ActiveSpaceOptions {
    fn from(act: &ActiveSpace) -> Self {
        Self {
            restricted_docc: act.restricted_doccpi(),
            active: act.active(),
            restricted_uocc: act.restricted_uoccpi(),
            n_active_electrons: act.n_active_electrons(),
        }
    }
}

impl fmt::Display for Psi4ActiveSpaceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# CAS({}e, {}o)",
            self.n_active_electrons,
            self.active.iter().sum::<usize>()
        )?;
        writeln!(f, "set {{")?;
        writeln!(
            f,
            "    restricted_docc         [{}]",
            self.restricted_docc.iter().join(", ")
        )?;
        writeln!(
            f,
            "    active                  [{}]",
            self.active.iter().join(", ")
        )?;
        writeln!(
            f,
            "    restricted_uocc         [{}]",
            self.restricted_uocc.iter().join(", ")
        )?;
        writeln!(f, "}}")?;
        Ok(())
    }
}
