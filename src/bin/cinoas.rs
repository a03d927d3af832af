use anyhow::{self, format_err};
use clap::Parser;

use cinoas::interfaces::cli::{log_heading, setup_logging, Cli};
use cinoas::interfaces::input::Input;
use cinoas::interfaces::psi4::Psi4CisJob;
use cinoas::interfaces::InputHandle;
use cinoas::io::{read_cinoas_yaml, write_cinoas_yaml};

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    if let Some(name) = cli.template.as_ref() {
        write_cinoas_yaml(name, &Input::default())?;
        println!(
            "Template configuration written to {}.",
            name.with_extension("yml").display()
        );
        return Ok(());
    }

    if let Some(job) = cli.psi4_cis.as_ref() {
        setup_logging(cli.output.as_deref(), cli.verbose)?;
        let job: Psi4CisJob = read_cinoas_yaml(job)?;
        return job.handle().map_err(|err| {
            log::error!("{err:#}");
            err
        });
    }

    let config = cli
        .config
        .as_ref()
        .ok_or_else(|| format_err!("No configuration file given. Use `--config <FILE>` or `--psi4-cis <FILE>`."))?;
    setup_logging(cli.output.as_deref(), cli.verbose)?;
    log_heading();

    let input: Input = read_cinoas_yaml(config)?;
    input.handle().map_err(|err| {
        log::error!("{err:#}");
        err
    })
}
