//! Interfaces between `cinoas` and other software.

use anyhow;

pub mod binaries;
pub mod cli;
pub mod input;
pub mod npy;
pub mod psi4;

/// Trait for handling an input specification.
pub trait InputHandle {
    /// Handles the input section and runs appropriate calculations.
    fn handle(&self) -> Result<(), anyhow::Error>;
}
