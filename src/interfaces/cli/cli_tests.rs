use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use log::LevelFilter;

use crate::interfaces::cli::{verbosity_level, Cli};

#[test]
fn test_interfaces_cli_parse() {
    Cli::command().debug_assert();

    let cli = Cli::parse_from(["cinoas", "-c", "ethene.yml", "-o", "ethene.out", "-vv"]);
    assert_eq!(cli.config, Some(PathBuf::from("ethene.yml")));
    assert_eq!(cli.output, Some(PathBuf::from("ethene.out")));
    assert!(cli.template.is_none());
    assert_eq!(cli.verbose, 2);

    let cli = Cli::parse_from(["cinoas", "--template", "config"]);
    assert_eq!(cli.template, Some(PathBuf::from("config")));
    assert!(cli.config.is_none());
    assert_eq!(cli.verbose, 0);
    assert!(cli.psi4_cis.is_none());

    let cli = Cli::parse_from(["cinoas", "--psi4-cis", "sacis.yml", "-v"]);
    assert_eq!(cli.psi4_cis, Some(PathBuf::from("sacis.yml")));
    assert!(cli.config.is_none());

    assert!(
        Cli::try_parse_from(["cinoas", "--psi4-cis", "sacis.yml", "-c", "ethene.yml"]).is_err()
    );
}

#[test]
fn test_interfaces_cli_verbosity_level() {
    assert_eq!(verbosity_level(0), LevelFilter::Warn);
    assert_eq!(verbosity_level(1), LevelFilter::Info);
    assert_eq!(verbosity_level(2), LevelFilter::Debug);
    assert_eq!(verbosity_level(5), LevelFilter::Trace);
}
