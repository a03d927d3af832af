//! Command-line interface of `cinoas`.

use std::path::{Path, PathBuf};

use anyhow::{self, format_err};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::append::Append;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::io::format::cinoas_output;

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted `cinoas` heading to the `cinoas-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    cinoas_output!("╭─────────────────────────────────────────────────────────────────────────────────────╮");
    cinoas_output!("│    ██████╗██╗███╗   ██╗ ██████╗  █████╗ ███████╗                                    │");
    cinoas_output!("│   ██╔════╝██║████╗  ██║██╔═══██╗██╔══██╗██╔════╝                                    │");
    cinoas_output!("│   ██║     ██║██╔██╗ ██║██║   ██║███████║███████╗                                    │");
    cinoas_output!("│   ██║     ██║██║╚██╗██║██║   ██║██╔══██║╚════██║                                    │");
    cinoas_output!("│   ╚██████╗██║██║ ╚████║╚██████╔╝██║  ██║███████║                                    │");
    cinoas_output!("│    ╚═════╝╚═╝╚═╝  ╚═══╝ ╚═════╝ ╚═╝  ╚═╝╚══════╝                                    │");
    cinoas_output!("│                                                                                     │");
    cinoas_output!("│   Active spaces from state-averaged CIS natural-orbital occupations   {version:>13} │");
    cinoas_output!("╰─────────────────────────────────────────────────────────────────────────────────────╯");
    cinoas_output!("");
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File to which the main output is written. If absent, the main output goes to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Writes a template configuration file to the given name (with a `.yml` extension added)
    /// and exits.
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// YAML file describing a Psi4 state-averaged CIS job. The Psi4 input is written (and run,
    /// if requested) instead of selecting an active space.
    #[arg(long, conflicts_with_all = ["config", "template"])]
    pub psi4_cis: Option<PathBuf>,

    /// Increases the detail of diagnostic logging on stderr. May be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Maps the number of `-v` flags to a level filter for diagnostic logging.
pub fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Configures `log4rs` such that records on the `cinoas-output` target go to `output` (or
/// stdout if `None`) and all other records go to stderr.
///
/// # Arguments
///
/// * `output` - An optional path to the main output file, which is truncated.
/// * `verbose` - The number of `-v` flags given.
pub fn setup_logging(
    output: Option<&Path>,
    verbose: u8,
) -> Result<log4rs::Handle, anyhow::Error> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{l}] {t} - {m}{n}")))
        .build();
    let output_appender: Box<dyn Append> = match output {
        Some(path) => Box::new(
            FileAppender::builder()
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .append(false)
                .build(path)
                .map_err(|err| {
                    format_err!("Unable to open output file `{}`: {err}", path.display())
                })?,
        ),
        None => Box::new(
            ConsoleAppender::builder()
                .target(Target::Stdout)
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .build(),
        ),
    };

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .appender(Appender::builder().build("output", output_appender))
        .logger(
            Logger::builder()
                .appender("output")
                .additive(false)
                .build("cinoas-output", LevelFilter::Info),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .build(verbosity_level(verbose)),
        )?;
    Ok(log4rs::init_config(config)?)
}
