use std::fmt;
use std::path::PathBuf;

use anyhow::{self, format_err, Context};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::drivers::CinoasDriver;
use crate::interfaces::psi4::Psi4ActiveSpaceOptions;
use crate::io::format::{cinoas_output, log_subtitle, log_title, nice_bool, CinoasOutput};
use crate::io::{write_cinoas_binary, CinoasFileType};
use crate::target::active_space::{ActiveSpace, OrbitalCandidate, SelectionCriterion};
use crate::target::natural_orbitals::{NaturalOrbitals, OrbitalBlock};


// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

fn default_selection() -> Option<SelectionCriterion> {
    Some(SelectionCriterion::Threshold(0.98))
}

fn default_print_level() -> usize {
    1
}

/// A structure containing control parameters for active-space selection.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct ActiveSpaceSelectionParams {
    /// The criterion for selecting active occupied orbitals. If `None`, no occupied orbitals
    /// are made active.
    #[builder(default = "default_selection()")]
    #[serde(rename = "occupied", default = "default_selection")]
    pub occupied_selection: Option<SelectionCriterion>,

    /// The criterion for selecting active virtual orbitals. If `None`, no virtual orbitals are
    /// made active.
    #[builder(default = "default_selection()")]
    #[serde(rename = "virtual", default = "default_selection")]
    pub virtual_selection: Option<SelectionCriterion>,

    /// The verbosity of the selection report. At `1` and above, each orbital is reported as it
    /// is added; at `2` and above, the block denominators are reported too.
    #[builder(default = "1")]
    #[serde(default = "default_print_level")]
    pub print_level: usize,

    /// Optional name for saving the result as a binary file of type [`CinoasFileType::Act`].
    /// If `None`, the result will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<PathBuf>,

    /// Optional path for writing the Psi4 orbital-space options of the selected active space.
    #[builder(default = "None")]
    #[serde(default)]
    pub psi4_options_save_name: Option<PathBuf>,
}

impl ActiveSpaceSelectionParams {
    /// Returns a builder to construct a [`ActiveSpaceSelectionParams`] structure.
    pub fn builder() -> ActiveSpaceSelectionParamsBuilder {
        ActiveSpaceSelectionParamsBuilder::default()
    }
}

impl Default for ActiveSpaceSelectionParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to build a default `ActiveSpaceSelectionParams`.")
    }
}

impl fmt::Display for ActiveSpaceSelectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_criterion = |criterion: Option<&SelectionCriterion>| {
            criterion
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string())
        };
        writeln!(
            f,
            "Occupied selection: {}",
            fmt_criterion(self.occupied_selection.as_ref())
        )?;
        writeln!(
            f,
            "Virtual selection: {}",
            fmt_criterion(self.virtual_selection.as_ref())
        )?;
        writeln!(f, "Print level: {}", self.print_level)?;
        writeln!(
            f,
            "Save active-space results to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                CinoasFileType::Act.path(name).display().to_string()
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(
            f,
            "Write Psi4 options to file: {}",
            if let Some(name) = self.psi4_options_save_name.as_ref() {
                name.display().to_string()
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

/// A driver for selecting an active space from CIS natural-orbital occupations.
#[derive(Clone, Builder)]
pub struct ActiveSpaceSelectionDriver<'a> {
    /// The control parameters.
    parameters: &'a ActiveSpaceSelectionParams,

    /// The CIS natural orbitals whose occupations drive the selection.
    natural_orbitals: &'a NaturalOrbitals,

    /// The selected active space.
    #[builder(setter(skip), default = "None")]
    result: Option<ActiveSpace>,
}

impl<'a> ActiveSpaceSelectionDriver<'a> {
    /// Returns a builder to construct a [`ActiveSpaceSelectionDriver`] structure.
    pub fn builder() -> ActiveSpaceSelectionDriverBuilder<'a> {
        ActiveSpaceSelectionDriverBuilder::default()
    }

    fn select_active_space(&mut self) -> Result<(), anyhow::Error> {
        log_title("Active-Space Selection");
        cinoas_output!("");
        let params = self.parameters;
        params.log_output_display();

        let act = ActiveSpace::from_natural_orbitals(
            self.natural_orbitals,
            params.occupied_selection.as_ref(),
            params.virtual_selection.as_ref(),
        )
        .with_context(|| "Unable to select an active space")?;

        if params.print_level > 1 {
            cinoas_output!("Occupied denominator Σ(1 - n): {:.10}", act.occ_denominator());
            cinoas_output!("Virtual denominator Σn: {:.10}", act.vir_denominator());
            cinoas_output!("");
        }

        if params.print_level > 0 {
            log_subtitle("Orbitals added");
            cinoas_output!("");
            let point_group = act.point_group();
            let log_added = |block: OrbitalBlock, cand: &OrbitalCandidate| {
                cinoas_output!(
                    "Add {:>8} orbital {:>3} in irrep {:>4}, CINO occupation: {:.10}",
                    block.to_string(),
                    cand.index_in_irrep,
                    point_group.irrep_label(cand.irrep),
                    cand.occupation
                );
            };
            act.selected_occupied()
                .iter()
                .for_each(|cand| log_added(OrbitalBlock::Occupied, cand));
            act.selected_virtual()
                .iter()
                .for_each(|cand| log_added(OrbitalBlock::Virtual, cand));
            cinoas_output!("");
            act.log_output_display();
            cinoas_output!("");
        }

        if let Some(name) = params.result_save_name.as_ref() {
            write_cinoas_binary(name, CinoasFileType::Act, &act)
                .with_context(|| "Unable to save active-space results")?;
            cinoas_output!(
                "Active-space results saved as {}.",
                CinoasFileType::Act.path(name).display()
            );
            cinoas_output!("");
        }

        let psi4_options = Psi4ActiveSpaceOptions::from(&act);
        log_subtitle("Psi4 orbital-space options");
        cinoas_output!("");
        psi4_options.log_output_display();
        cinoas_output!("");
        if let Some(path) = params.psi4_options_save_name.as_ref() {
            psi4_options.write(path)?;
            cinoas_output!("Psi4 options written to {}.", path.display());
            cinoas_output!("");
        }

        self.result = Some(act);
        Ok(())
    }
}

impl<'a> CinoasDriver for ActiveSpaceSelectionDriver<'a> {
    type Params = ActiveSpaceSelectionParams;

    type Outcome = ActiveSpace;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No active-space selection results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.select_active_space()
    }
}
