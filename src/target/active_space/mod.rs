//! Active spaces selected from CIS natural-orbital occupations.

use std::fmt;

use anyhow::{self, bail, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::io::format::write_subtitle;
use crate::symmetry::PointGroup;
use crate::target::natural_orbitals::{NaturalOrbitals, OrbitalBlock};


/// Denominators smaller than this in magnitude are treated as zero.
const ZERO_DENOMINATOR_THRESHOLD: f64 = 1e-14;

// ==================
// Struct definitions
// ==================

/// An enumerated type for the rule by which orbitals in one block (occupied or virtual) are
/// made active.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SelectionCriterion {
    /// Orbitals are added in order of importance for as long as the fraction of the block's
    /// total deviation from the reference occupation captured so far does not exceed the
    /// associated value, which must lie in $`[0, 1]`$.
    Threshold(f64),

    /// A fixed number of the most important orbitals is added.
    Count(usize),
}

impl fmt::Display for SelectionCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionCriterion::Threshold(thresh) => write!(f, "cumulative fraction ≤ {thresh}"),
            SelectionCriterion::Count(n) => write!(f, "{n} orbital(s)"),
        }
    }
}

/// A CIS natural orbital considered for inclusion in the active space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitalCandidate {
    /// The irrep to which the orbital belongs.
    pub irrep: usize,

    /// The index of the orbital within its block (occupied or virtual) of its irrep.
    pub index_in_irrep: usize,

    /// The natural-orbital occupation number.
    pub occupation: f64,
}

/// A structure containing an active space selected from CIS natural-orbital occupations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveSpace {
    /// The point group in which the orbitals are blocked.
    point_group: PointGroup,

    /// The number of doubly-occupied reference orbitals in each irrep.
    doccpi: Vec<usize>,

    /// The number of virtual reference orbitals in each irrep.
    nvirpi: Vec<usize>,

    /// The number of active occupied orbitals in each irrep.
    active_occupied: Vec<usize>,

    /// The number of active virtual orbitals in each irrep.
    active_virtual: Vec<usize>,

    /// The fraction of the total occupied-block deviation $`\sum (1 - n)`$ captured by the
    /// active occupied orbitals. This is `None` if no occupied orbitals were requested.
    sigma_o: Option<f64>,

    /// The fraction of the total virtual-block occupation $`\sum n`$ captured by the active
    /// virtual orbitals. This is `None` if no virtual orbitals were requested.
    sigma_v: Option<f64>,

    /// $`\sum_h (N^{\mathrm{docc}}_h - \sum_{i \in h} n_i)`$ over all occupied CINOs.
    occ_denominator: f64,

    /// $`\sum_h \sum_{a \in h} n_a`$ over all virtual CINOs.
    vir_denominator: f64,

    /// The active occupied orbitals in the order they were selected.
    selected_occupied: Vec<OrbitalCandidate>,

    /// The active virtual orbitals in the order they were selected.
    selected_virtual: Vec<OrbitalCandidate>,
}

impl ActiveSpace {
    /// Selects an active space from the CINO occupations of `nos`.
    ///
    /// See [`Self::select`] for details.
    pub fn from_natural_orbitals(
        nos: &NaturalOrbitals,
        occupied_criterion: Option<&SelectionCriterion>,
        virtual_criterion: Option<&SelectionCriterion>,
    ) -> Result<Self, anyhow::Error> {
        Self::select(
            nos.point_group(),
            nos.occupied_occupations(),
            nos.virtual_occupations(),
            occupied_criterion,
            virtual_criterion,
        )
    }

    /// Selects an active space from occupied and virtual CINO occupations.
    ///
    /// Occupied CINOs from all irreps are ranked by ascending occupation, so that the most
    /// depleted orbitals come first, and are weighted by $`1 - n`$. Virtual CINOs are ranked by
    /// descending occupation and weighted by $`n`$. Orbitals with equal occupations keep
    /// their irrep-major order. Each block is then truncated according to its criterion:
    ///
    /// - [`SelectionCriterion::Threshold`]: orbitals are taken in rank order until adding the
    ///   next one would make the accumulated weight divided by the total block weight exceed
    ///   the threshold;
    /// - [`SelectionCriterion::Count`]: the leading orbitals are taken.
    ///
    /// A block without a criterion contributes no active orbitals.
    ///
    /// # Arguments
    ///
    /// * `point_group` - The point group in which the orbitals are blocked.
    /// * `occupied_occupations` - The occupied CINO occupations, one array per irrep.
    /// * `virtual_occupations` - The virtual CINO occupations, one array per irrep.
    /// * `occupied_criterion` - The selection criterion for the occupied block.
    /// * `virtual_criterion` - The selection criterion for the virtual block.
    ///
    /// # Errors
    ///
    /// Errors if the number of irreps is inconsistent, if a threshold lies outside $`[0, 1]`$,
    /// or if more orbitals are requested than exist in a block.
    pub fn select(
        point_group: PointGroup,
        occupied_occupations: &[Array1<f64>],
        virtual_occupations: &[Array1<f64>],
        occupied_criterion: Option<&SelectionCriterion>,
        virtual_criterion: Option<&SelectionCriterion>,
    ) -> Result<Self, anyhow::Error> {
        let nirrep = point_group.n_irreps();
        ensure!(
            occupied_occupations.len() == nirrep && virtual_occupations.len() == nirrep,
            "Point group {point_group} has {nirrep} irreps, but {} occupied and {} virtual occupation arrays were given.",
            occupied_occupations.len(),
            virtual_occupations.len()
        );

        let doccpi = occupied_occupations.iter().map(|o| o.len()).collect_vec();
        let nvirpi = virtual_occupations.iter().map(|v| v.len()).collect_vec();

        let occ_denominator = occupied_occupations
            .iter()
            .map(|occs| occs.len() as f64 - occs.sum())
            .sum::<f64>();
        let vir_denominator = virtual_occupations
            .iter()
            .map(|occs| occs.sum())
            .sum::<f64>();
        log::debug!("Occupied denominator: {occ_denominator}");
        log::debug!("Virtual denominator: {vir_denominator}");

        let occupied_candidates = candidates(occupied_occupations)
            .sorted_by(|a, b| a.occupation.total_cmp(&b.occupation))
            .collect_vec();
        let virtual_candidates = candidates(virtual_occupations)
            .sorted_by(|a, b| b.occupation.total_cmp(&a.occupation))
            .collect_vec();

        let (selected_occupied, sigma_o) = match occupied_criterion {
            Some(criterion) => {
                let (selected, sigma) = truncate(
                    &occupied_candidates,
                    |n| 1.0 - n,
                    occ_denominator,
                    criterion,
                    OrbitalBlock::Occupied,
                )?;
                (selected, Some(sigma))
            }
            None => (vec![], None),
        };
        let (selected_virtual, sigma_v) = match virtual_criterion {
            Some(criterion) => {
                let (selected, sigma) = truncate(
                    &virtual_candidates,
                    |n| n,
                    vir_denominator,
                    criterion,
                    OrbitalBlock::Virtual,
                )?;
                (selected, Some(sigma))
            }
            None => (vec![], None),
        };

        let mut active_occupied = vec![0; nirrep];
        selected_occupied
            .iter()
            .for_each(|cand| active_occupied[cand.irrep] += 1);
        let mut active_virtual = vec![0; nirrep];
        selected_virtual
            .iter()
            .for_each(|cand| active_virtual[cand.irrep] += 1);

        Ok(Self {
            point_group,
            doccpi,
            nvirpi,
            active_occupied,
            active_virtual,
            sigma_o,
            sigma_v,
            occ_denominator,
            vir_denominator,
            selected_occupied,
            selected_virtual,
        })
    }

    /// The point group in which the orbitals are blocked.
    pub fn point_group(&self) -> PointGroup {
        self.point_group
    }

    /// The number of active orbitals in each irrep.
    pub fn active(&self) -> Vec<usize> {
        self.active_occupied
            .iter()
            .zip(self.active_virtual.iter())
            .map(|(o, v)| o + v)
            .collect()
    }

    /// The number of active occupied orbitals in each irrep.
    pub fn active_occupied(&self) -> &[usize] {
        &self.active_occupied
    }

    /// The number of active virtual orbitals in each irrep.
    pub fn active_virtual(&self) -> &[usize] {
        &self.active_virtual
    }

    /// The total number of active orbitals.
    pub fn nact(&self) -> usize {
        self.nact_occ() + self.nact_vir()
    }

    /// The total number of active occupied orbitals.
    pub fn nact_occ(&self) -> usize {
        self.selected_occupied.len()
    }

    /// The total number of active virtual orbitals.
    pub fn nact_vir(&self) -> usize {
        self.selected_virtual.len()
    }

    /// The captured fraction of the occupied weight, or `None` if no occupied orbitals were requested.
    pub fn sigma_o(&self) -> Option<f64> {
        self.sigma_o
    }

    /// The captured fraction of the virtual weight, or `None` if no virtual orbitals were requested.
    pub fn sigma_v(&self) -> Option<f64> {
        self.sigma_v
    }

    /// The total occupied weight, the sum of `1 - n` over all occupied CINOs.
    pub fn occ_denominator(&self) -> f64 {
        self.occ_denominator
    }

    /// The total virtual weight, the sum of `n` over all virtual CINOs.
    pub fn vir_denominator(&self) -> f64 {
        self.vir_denominator
    }

    /// The active occupied orbitals in the order they were selected.
    pub fn selected_occupied(&self) -> &[OrbitalCandidate] {
        &self.selected_occupied
    }

    /// The active virtual orbitals in the order they were selected.
    pub fn selected_virtual(&self) -> &[OrbitalCandidate] {
        &self.selected_virtual
    }

    /// The number of active electrons, two per active occupied orbital of the closed-shell
    /// reference.
    pub fn n_active_electrons(&self) -> usize {
        2 * self.nact_occ()
    }

    /// The number of doubly-occupied orbitals outside the active space in each irrep.
    pub fn restricted_doccpi(&self) -> Vec<usize> {
        self.doccpi
            .iter()
            .zip(self.active_occupied.iter())
            .map(|(docc, act)| docc - act)
            .collect()
    }

    /// The number of unoccupied orbitals outside the active space in each irrep.
    pub fn restricted_uoccpi(&self) -> Vec<usize> {
        self.nvirpi
            .iter()
            .zip(self.active_virtual.iter())
            .map(|(nvir, act)| nvir - act)
            .collect()
    }

    /// The number of active orbitals keyed by irrep label.
    pub fn active_by_irrep(&self) -> IndexMap<&'static str, usize> {
        self.active()
            .into_iter()
            .enumerate()
            .map(|(h, n)| (self.point_group.irrep_label(h), n))
            .collect()
    }
}

impl fmt::Display for ActiveSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Active space")?;
        writeln!(f)?;
        writeln!(f, "{}", "┈".repeat(50))?;
        writeln!(
            f,
            "{:>6} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "Irrep", "RDOCC", "ACT(o)", "ACT(v)", "RUOCC", "ACT"
        )?;
        writeln!(f, "{}", "┈".repeat(50))?;
        let rdocc = self.restricted_doccpi();
        let ruocc = self.restricted_uoccpi();
        let active = self.active();
        (0..self.doccpi.len()).try_for_each(|h| {
            writeln!(
                f,
                "{:>6} {:>8} {:>8} {:>8} {:>8} {:>8}",
                self.point_group.irrep_label(h),
                rdocc[h],
                self.active_occupied[h],
                self.active_virtual[h],
                ruocc[h],
                active[h]
            )
        })?;
        writeln!(f, "{}", "┈".repeat(50))?;
        writeln!(
            f,
            "Number of active orbitals: {} ({} occupied, {} virtual)",
            self.nact(),
            self.nact_occ(),
            self.nact_vir()
        )?;
        writeln!(f, "Number of active electrons: {}", self.n_active_electrons())?;
        writeln!(f, "Active: [{}]", active.iter().join(", "))?;
        let fmt_sigma = |sigma: Option<f64>| {
            sigma
                .map(|s| format!("{s:.6}"))
                .unwrap_or_else(|| "--".to_string())
        };
        writeln!(f, "σ(occ): {}", fmt_sigma(self.sigma_o))?;
        writeln!(f, "σ(vir): {}", fmt_sigma(self.sigma_v))?;
        Ok(())
    }
}

// =========
// Functions
// =========

/// Flattens per-irrep occupations into candidates in irrep-major order.
fn candidates(occupations: &[Array1<f64>]) -> impl Iterator<Item = OrbitalCandidate> + '_ {
    occupations.iter().enumerate().flat_map(|(irrep, occs)| {
        occs.iter()
            .enumerate()
            .map(move |(index_in_irrep, &occupation)| OrbitalCandidate {
                irrep,
                index_in_irrep,
                occupation,
            })
    })
}

/// Truncates a ranked list of candidates according to a criterion.
///
/// # Returns
///
/// The selected candidates and the captured fraction of the block's total weight. The fraction
/// is zero if the total weight vanishes.
fn truncate<W>(
    ranked: &[OrbitalCandidate],
    weight: W,
    denominator: f64,
    criterion: &SelectionCriterion,
    block: OrbitalBlock,
) -> Result<(Vec<OrbitalCandidate>, f64), anyhow::Error>
where
    W: Fn(f64) -> f64,
{
    let zero_denominator = denominator.abs() < ZERO_DENOMINATOR_THRESHOLD;
    let fraction = |numerator: f64| {
        if zero_denominator {
            0.0
        } else {
            numerator / denominator
        }
    };
    match criterion {
        SelectionCriterion::Threshold(thresh) => {
            if !(0.0..=1.0).contains(thresh) {
                bail!("The {block} threshold must lie in [0, 1], but {thresh} was given.");
            }
            if zero_denominator {
                log::warn!(
                    "The total {block} weight vanishes; no {block} orbitals will be selected."
                );
                return Ok((vec![], 0.0));
            }
            let mut numerator = 0.0;
            let mut selected = vec![];
            for cand in ranked {
                let w = weight(cand.occupation);
                numerator += w;
                if fraction(numerator) > *thresh {
                    numerator -= w;
                    break;
                }
                selected.push(cand.clone());
            }
            Ok((selected, fraction(numerator)))
        }
        SelectionCriterion::Count(n) => {
            if *n > ranked.len() {
                bail!(
                    "{n} active {block} orbital(s) requested, but only {} are available.",
                    ranked.len()
                );
            }
            let selected = ranked[..*n].to_vec();
            let numerator = selected
                .iter()
                .map(|cand| weight(cand.occupation))
                .sum::<f64>();
            Ok((selected, fraction(numerator)))
        }
    }
}
