//! `cinoas` interface with raw binary data files.

use std::fs;
use std::mem::size_of;
use std::path::{Path, PathBuf};

use anyhow::{self, bail, format_err, Context};
use byteorder::{BigEndian, LittleEndian};
use derive_builder::Builder;
use ndarray::{Array2, ShapeBuilder};
use serde::{Deserialize, Serialize};

use crate::interfaces::input::CisReferenceSourceHandle;
use crate::io::numeric::{NumericReader, NumericWriter};
use crate::symmetry::PointGroup;
use crate::target::reference::CisReference;

#[cfg(test)]
#[path = "binaries_tests.rs"]
mod binaries_tests;

/// Enumerated type indicating the order the matrix elements are traversed when stored into or
/// read in from a binary file.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum MatrixOrder {
    #[default]
    RowMajor,
    ColMajor,
}

/// Enumerated type indicating the byte order of numerical values in binary files.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Input target: CIS reference; source: binaries
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Serialisable/deserialisable structure containing control parameters for acquiring the
/// symmetry-blocked CIS density and reference orbitals from raw binary files of `f64` values.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct BinariesCisSource {
    /// The point group in which the orbitals are blocked.
    pub point_group: PointGroup,

    /// The number of doubly-occupied reference orbitals in each irrep.
    pub doccpi: Vec<usize>,

    /// Paths to binary files containing the molecular-orbital-basis alpha density blocks, one
    /// per irrep.
    pub densities: Vec<PathBuf>,

    /// Paths to binary files containing the molecular-orbital coefficient blocks, one per
    /// irrep. The number of rows of each block is inferred from the number of values read
    /// and the dimension of the corresponding density block.
    pub coefficients: Vec<PathBuf>,

    /// Specification of the order matrix elements are packed in binary files.
    #[builder(default)]
    #[serde(default)]
    pub matrix_order: MatrixOrder,

    /// Specification of the byte order numerical values are stored in binary files.
    #[builder(default)]
    #[serde(default)]
    pub byte_order: ByteOrder,
}

impl BinariesCisSource {
    /// Returns a builder to construct a structure for handling binaries CIS source.
    pub fn builder() -> BinariesCisSourceBuilder {
        BinariesCisSourceBuilder::default()
    }
}

impl Default for BinariesCisSource {
    fn default() -> Self {
        BinariesCisSource::builder()
            .point_group(PointGroup::C2v)
            .doccpi(vec![3, 0, 1, 1])
            .densities(
                (0..4)
                    .map(|h| PathBuf::from(format!("path/to/density/irrep{h}")))
                    .collect(),
            )
            .coefficients(
                (0..4)
                    .map(|h| PathBuf::from(format!("path/to/coefficients/irrep{h}")))
                    .collect(),
            )
            .build()
            .expect("Unable to build a default `BinariesCisSource`.")
    }
}

impl CisReferenceSourceHandle for BinariesCisSource {
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
            .map(|path| {
                read_square_matrix(path, self.matrix_order, self.byte_order).with_context(|| {
                    format!(
                        "Unable to read the density block `{}` when handling binaries CIS source",
                        path.display()
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let coefficient_blocks = self
            .coefficients
            .iter()
            .zip(density_blocks.iter())
            .map(|(path, den)| {
                read_matrix_with_ncols(path, den.nrows(), self.matrix_order, self.byte_order)
                    .with_context(|| {
                        format!(
                            "Unable to read the coefficient block `{}` when handling binaries CIS source",
                            path.display()
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        CisReference::builder()
            .point_group(self.point_group)
            .doccpi(self.doccpi.clone())
            .density_blocks(density_blocks)
            .coefficient_blocks(coefficient_blocks)
            .build()
            .with_context(|| "Unable to construct a CIS reference when handling binaries CIS source")
    }
}

// =========
// Functions
// =========

/// Reads all `f64` values from a binary file.
///
/// The file length must be a whole number of `f64` records, and every record must be read.
pub fn read_f64s<P: AsRef<Path>>(
    path: P,
    byte_order: ByteOrder,
) -> Result<Vec<f64>, anyhow::Error> {
    let nbytes = fs::metadata(&path)
        .with_context(|| format!("Unable to stat `{}`", path.as_ref().display()))?
        .len();
    let record = size_of::<f64>() as u64;
    if nbytes % record != 0 {
        bail!(
            "`{}` has {nbytes} byte(s), which is not a whole number of {record}-byte values.",
            path.as_ref().display()
        );
    }
    let values = match byte_order {
        ByteOrder::LittleEndian => {
            NumericReader::<_, LittleEndian, f64>::from_file(&path)?.collect::<Vec<_>>()
        }
        ByteOrder::BigEndian => {
            NumericReader::<_, BigEndian, f64>::from_file(&path)?.collect::<Vec<_>>()
        }
    };
    if values.len() as u64 * record != nbytes {
        bail!(
            "Only {} of {} value(s) could be read from `{}`.",
            values.len(),
            nbytes / record,
            path.as_ref().display()
        );
    }
    Ok(values)
}

/// Arranges values into a matrix of the given shape following a matrix order.
fn to_matrix(
    values: Vec<f64>,
    shape: (usize, usize),
    matrix_order: MatrixOrder,
) -> Result<Array2<f64>, anyhow::Error> {
    match matrix_order {
        MatrixOrder::RowMajor => Array2::from_shape_vec(shape, values),
        MatrixOrder::ColMajor => Array2::from_shape_vec(shape.f(), values),
    }
    .map_err(|err| format_err!(err))
}

/// Reads a square matrix from a binary file. The number of values must be a perfect square.
pub fn read_square_matrix<P: AsRef<Path>>(
    path: P,
    matrix_order: MatrixOrder,
    byte_order: ByteOrder,
) -> Result<Array2<f64>, anyhow::Error> {
    let values = read_f64s(path, byte_order)?;
    let n = (values.len() as f64).sqrt().round() as usize;
    if n * n != values.len() {
        bail!(
            "{} value(s) cannot be arranged into a square matrix.",
            values.len()
        );
    }
    to_matrix(values, (n, n), matrix_order)
}

/// Reads a matrix with a known number of columns from a binary file. The number of rows is
/// inferred from the number of values read.
pub fn read_matrix_with_ncols<P: AsRef<Path>>(
    path: P,
    ncols: usize,
    matrix_order: MatrixOrder,
    byte_order: ByteOrder,
) -> Result<Array2<f64>, anyhow::Error> {
    let values = read_f64s(path, byte_order)?;
    if ncols == 0 {
        if !values.is_empty() {
            bail!(
                "{} value(s) found for a matrix without columns.",
                values.len()
            );
        }
        return Ok(Array2::zeros((0, 0)));
    }
    if values.len() % ncols != 0 {
        bail!(
            "{} value(s) cannot be arranged into a matrix with {ncols} columns.",
            values.len()
        );
    }
    let nrows = values.len() / ncols;
    to_matrix(values, (nrows, ncols), matrix_order)
}

/// Writes a matrix into a binary file.
///
/// # Returns
///
/// The number of values written.
pub fn write_matrix<P: AsRef<Path>>(
    path: P,
    mat: &Array2<f64>,
    matrix_order: MatrixOrder,
    byte_order: ByteOrder,
) -> Result<usize, anyhow::Error> {
    let values: Box<dyn Iterator<Item = f64> + '_> = match matrix_order {
        MatrixOrder::RowMajor => Box::new(mat.iter().copied()),
        MatrixOrder::ColMajor => Box::new(mat.t().into_iter().copied()),
    };
    match byte_order {
        ByteOrder::LittleEndian => NumericWriter::<_, LittleEndian>::to_file(&path)?.write_f64s(values),
        ByteOrder::BigEndian => NumericWriter::<_, BigEndian>::to_file(&path)?.write_f64s(values),
    }
}
