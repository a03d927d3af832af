//! Targets of `cinoas` calculations.

pub mod active_space;
pub mod natural_orbitals;
pub mod reference;
