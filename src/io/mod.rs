//! Reading and writing `cinoas` files.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{self, format_err};
use bincode;
use serde::{de::DeserializeOwned, Serialize};
use serde_yaml;

pub(crate) mod format;
pub mod numeric;


/// An enumerated type for `cinoas` binary file types.
pub enum CinoasFileType {
    /// Variant for binary files containing CIS natural-orbital results.
    Cino,

    /// Variant for binary files containing active-space selection results.
    Act,
}

impl CinoasFileType {
    /// Returns the extension of the file type.
    pub fn ext(&self) -> String {
        match self {
            CinoasFileType::Cino => "cinoas.cino".to_string(),
            CinoasFileType::Act => "cinoas.act".to_string(),
        }
    }

    /// Returns the path of the file of this type with the given name. Any existing extension
    /// on `name` is replaced.
    pub fn path<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        let mut path = name.as_ref().to_path_buf();
        path.set_extension(self.ext());
        path
    }
}

/// Reads a `cinoas` binary file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (without `cinoas`-specific extensions).
/// * `file_type` - The type of the `cinoas` file to be read in.
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_cinoas_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: CinoasFileType,
) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let path = file_type.path(name);
    let mut reader = BufReader::new(File::open(path).map_err(|err| format_err!(err))?);
    bincode::deserialize_from(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes it into a `cinoas` binary file.
///
/// # Arguments
///
/// * `name` - The name of the file to be written (without `cinoas`-specific extensions).
/// * `file_type` - The type of the `cinoas` file to be written.
/// * `value` - The structure to be serialised.
pub fn write_cinoas_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: CinoasFileType,
    value: &T,
) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let path = file_type.path(name);
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value).map_err(|err| format_err!(err))
}

/// Reads a `cinoas` configuration YAML file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (with its `.yml` or `.yaml` extension).
pub fn read_cinoas_yaml<T, P: AsRef<Path>>(name: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut reader = BufReader::new(File::open(name).map_err(|err| format_err!(err))?);
    serde_yaml::from_reader(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes it into a `cinoas` configuration YAML file.
///
/// # Arguments
///
/// * `name` - The name of the YAML file to be written (without extensions). The resulting file
/// will have the `.yml` extension.
/// * `value` - The structure to be serialised.
pub fn write_cinoas_yaml<T, P: AsRef<Path>>(name: P, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension("yml");
    let mut writer = BufWriter::new(File::create(path)?);
    serde_yaml::to_writer(&mut writer, value).map_err(|err| format_err!(err))
}
