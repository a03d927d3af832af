//! # cinoas: active-space selection from CIS natural orbitals
//!
//! `cinoas` selects active spaces for multiconfigurational calculations from the natural
//! orbitals of a state-averaged configuration-interaction-singles (SA-CIS) one-particle
//! density. Within each irrep of an Abelian point group, the occupied–occupied and
//! virtual–virtual blocks of the density are diagonalised separately to give CIS natural
//! orbitals (CINOs). The occupied CINOs most depleted from unit alpha occupation and the virtual
//! CINOs with the largest occupations are then made active until a cumulative-fraction
//! threshold or a fixed count is reached.
//!
//! The selected space is reported per irrep in Cotton order together with the Psi4
//! `restricted_docc`/`active`/`restricted_uocc` options for a subsequent CASSCF calculation.
//!
//! ## Getting started
//!
//! The `cinoas` binary is driven by a YAML configuration file. A template can be generated with
//!
//! ```bash
//! cinoas --template config
//! ```
//!
//! and a calculation run with
//!
//! ```bash
//! cinoas -c config.yml -o output.out
//! ```
//!
//! The density and orbital blocks can be supplied as raw binary files of `f64` values or as
//! NumPy `.npy` arrays. A Psi4 input that produces them can be generated with
//! [`interfaces::psi4::Psi4CisInput`], or from the command line with
//!
//! ```bash
//! cinoas --psi4-cis sacis.yml
//! ```
//!
//! where `sacis.yml` describes a [`interfaces::psi4::Psi4CisJob`].

pub mod drivers;
pub mod interfaces;
pub mod io;
pub mod symmetry;
pub mod target;
