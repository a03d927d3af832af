//! Formatting of `cinoas` output.

use std::fmt;

use log;

const CINOAS_BANNER_LENGTH: usize = 89;

/// Logs a warning to the `cinoas-output` logger as well as to the default logger.
macro_rules! cinoas_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::warn!($fmt, $($($arg)*)?);
        log::warn!(target: "cinoas-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a main output line to the `cinoas-output` logger.
macro_rules! cinoas_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "cinoas-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {cinoas_output, cinoas_warn};

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted section title to the `cinoas-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(CINOAS_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    cinoas_output!("┌──{bar}──┐");
    cinoas_output!("│§ {title:^length$} §│");
    cinoas_output!("└──{bar}──┘");
}

/// Logs a nicely formatted subtitle to the `cinoas-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    cinoas_output!("{}", subtitle);
    cinoas_output!("{}", bar);
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging `cinoas` outputs nicely.
pub(crate) trait CinoasOutput: fmt::Display {
    /// Logs display output line by line.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            cinoas_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> CinoasOutput for T where T: fmt::Display {}
