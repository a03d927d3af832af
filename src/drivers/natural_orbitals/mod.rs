use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{self, format_err, Context};
use derive_builder::Builder;
use log;
use ndarray_npy::write_npy;
use serde::{Deserialize, Serialize};

use crate::drivers::CinoasDriver;
use crate::interfaces::binaries::{write_matrix, ByteOrder, MatrixOrder};
use crate::io::format::{cinoas_output, log_subtitle, log_title, nice_bool, CinoasOutput};
use crate::io::{write_cinoas_binary, CinoasFileType};
use crate::target::natural_orbitals::NaturalOrbitals;
use crate::target::reference::CisReference;

#[cfg(test)]
#[path = "natural_orbitals_tests.rs"]
mod natural_orbitals_tests;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// Enumerated type indicating the format in which CINO coefficient blocks are exported.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoefficientsFormat {
    /// Raw binary files of `f64` values.
    Binaries {
        #[serde(default)]
        matrix_order: MatrixOrder,
        #[serde(default)]
        byte_order: ByteOrder,
    },

    /// NumPy `.npy` files.
    Npy,
}

impl Default for CoefficientsFormat {
    fn default() -> Self {
        CoefficientsFormat::Binaries {
            matrix_order: MatrixOrder::default(),
            byte_order: ByteOrder::default(),
        }
    }
}

impl CoefficientsFormat {
    /// The file extension used for coefficient files of this format.
    pub fn ext(&self) -> &'static str {
        match self {
            CoefficientsFormat::Binaries { .. } => "bin",
            CoefficientsFormat::Npy => "npy",
        }
    }
}

impl fmt::Display for CoefficientsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoefficientsFormat::Binaries {
                matrix_order,
                byte_order,
            } => write!(f, "binaries ({matrix_order:?}, {byte_order:?})"),
            CoefficientsFormat::Npy => write!(f, "npy"),
        }
    }
}

/// A structure containing control parameters for the construction of CIS natural orbitals.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct CinoParams {
    /// Boolean indicating if the CINO occupation numbers are to be written to the output.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub write_occupations: bool,

    /// Optional name for saving the result as a binary file of type [`CinoasFileType::Cino`].
    /// If `None`, the result will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<PathBuf>,

    /// Optional stem for exporting the CINO coefficient blocks, one file per irrep named
    /// `<stem>.irrep<h>.<ext>`. If `None`, the coefficients will not be exported.
    #[builder(default = "None")]
    #[serde(default)]
    pub coefficients_save_name: Option<PathBuf>,

    /// The format in which the CINO coefficient blocks are exported.
    #[builder(default)]
    #[serde(default)]
    pub coefficients_format: CoefficientsFormat,
}

fn default_true() -> bool {
    true
}

impl CinoParams {
    /// Returns a builder to construct a [`CinoParams`] structure.
    pub fn builder() -> CinoParamsBuilder {
        CinoParamsBuilder::default()
    }
}

impl Default for CinoParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to build a default `CinoParams`.")
    }
}

impl fmt::Display for CinoParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Write CINO occupations: {}",
            nice_bool(self.write_occupations)
        )?;
        writeln!(
            f,
            "Save CINO results to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                CinoasFileType::Cino.path(name).display().to_string()
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(
            f,
            "Export CINO coefficients: {}",
            if let Some(name) = self.coefficients_save_name.as_ref() {
                format!(
                    "{}.irrep*.{} in {}",
                    name.display(),
                    self.coefficients_format.ext(),
                    self.coefficients_format
                )
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for the construction of CIS natural orbitals from a symmetry-blocked CIS reference.
#[derive(Clone, Builder)]
pub struct CinoDriver<'a> {
    /// The control parameters.
    parameters: &'a CinoParams,

    /// The CIS density and reference orbitals.
    reference: &'a CisReference,

    /// The natural orbitals constructed.
    #[builder(setter(skip), default = "None")]
    result: Option<NaturalOrbitals>,
}

impl<'a> CinoDriver<'a> {
    /// Returns a builder to construct a [`CinoDriver`] structure.
    pub fn builder() -> CinoDriverBuilder<'a> {
        CinoDriverBuilder::default()
    }

    fn construct_natural_orbitals(&mut self) -> Result<(), anyhow::Error> {
        log_title("CIS Natural Orbitals");
        cinoas_output!("");
        let params = self.parameters;
        params.log_output_display();

        log_subtitle("CIS reference");
        cinoas_output!("");
        self.reference.log_output_display();
        cinoas_output!("");

        let nos = NaturalOrbitals::from_reference(self.reference)
            .with_context(|| "Unable to construct CIS natural orbitals")?;
        log::debug!(
            "Total alpha occupation: {:.10} (density trace {:.10}).",
            nos.n_electrons_alpha(),
            self.reference.density_trace()
        );
        if params.write_occupations {
            nos.log_output_display();
            cinoas_output!("");
        }

        if let Some(name) = params.result_save_name.as_ref() {
            write_cinoas_binary(name, CinoasFileType::Cino, &nos)
                .with_context(|| "Unable to save CINO results")?;
            cinoas_output!(
                "CINO results saved as {}.",
                CinoasFileType::Cino.path(name).display()
            );
            cinoas_output!("");
        }

        if let Some(stem) = params.coefficients_save_name.as_ref() {
            let paths = export_coefficients(&nos, stem, &params.coefficients_format)?;
            cinoas_output!("CINO coefficient blocks exported:");
            paths.iter().for_each(|path| {
                cinoas_output!("  {}", path.display());
            });
            cinoas_output!("");
        }

        self.result = Some(nos);
        Ok(())
    }
}

impl<'a> CinoasDriver for CinoDriver<'a> {
    type Params = CinoParams;

    type Outcome = NaturalOrbitals;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No CIS natural orbitals found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.construct_natural_orbitals()
    }
}

// =========
// Functions
// =========

/// Returns the path of the coefficient file for irrep `h`.
fn coefficients_path(stem: &Path, h: usize, ext: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(format!(".irrep{h}.{ext}"));
    PathBuf::from(name)
}

/// Exports the CINO coefficient blocks, one file per irrep.
///
/// # Returns
///
/// The paths of the files written.
fn export_coefficients(
    nos: &NaturalOrbitals,
    stem: &Path,
    format: &CoefficientsFormat,
) -> Result<Vec<PathBuf>, anyhow::Error> {
    nos.coefficients()
        .iter()
        .enumerate()
        .map(|(h, c)| {
            let path = coefficients_path(stem, h, format.ext());
            match format {
                CoefficientsFormat::Binaries {
                    matrix_order,
                    byte_order,
                } => {
                    write_matrix(&path, c, *matrix_order, *byte_order)?;
                }
                CoefficientsFormat::Npy => {
                    write_npy(&path, c).map_err(|err| format_err!(err))?;
                }
            }
            log::debug!("Coefficients of irrep {h} written to {}.", path.display());
            Ok(path)
        })
        .collect::<Result<Vec<_>, anyhow::Error>>()
        .with_context(|| "Unable to export CINO coefficients")
}
