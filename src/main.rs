use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use user_mac_mapper::cli::{Cli, Command};
use user_mac_mapper::error::MapperError;
use user_mac_mapper::export::verify::verify_report;
use user_mac_mapper::logging::init_logging;
use user_mac_mapper::orchestrator::{read_table, run_map, run_preview};
use user_mac_mapper::util::envfile::{load_dotenv_if_present, write_env_template};

/// Exit code for problems with the user's files or arguments.
const EXIT_INPUT: i32 = 2;
const EXIT_INTERNAL: i32 = 1;

fn main() {
    init_logging();
    if let Err(e) = load_dotenv_if_present() {
        log::warn!("could not load .env: {:#}", e);
    }
    // Parse after .env so its values feed clap's env fallbacks
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<MapperError>() {
            Some(me) => {
                error!("{}", me.user_message());
                let code = if me.is_input_error() {
                    EXIT_INPUT
                } else {
                    EXIT_INTERNAL
                };
                std::process::exit(code);
            }
            None => {
                error!("{:#}", e);
                std::process::exit(EXIT_INTERNAL);
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Map {
            inputs,
            out,
            summary,
        } => {
            let cfg = inputs
                .to_app_config(Some(&out), summary.as_deref())
                .map_err(MapperError::from)?;
            let outcome = run_map(&cfg)?;
            println!(
                "Created mapping file {} ({} rows)",
                outcome.out_path, outcome.rows
            );
        }
        Command::Preview { inputs } => {
            let cfg = inputs.to_app_config(None, None).map_err(MapperError::from)?;
            let preview = run_preview(&cfg)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&preview).context("serialize preview")?
            );
        }
        Command::Verify { report } => {
            let table = read_table(&report)?;
            let r = verify_report(&table).map_err(MapperError::from)?;
            info!("Verified {}", report);
            print!("{}", r);
        }
        Command::EnvTemplate { path } => {
            write_env_template(&path)?;
            println!("Wrote {}. Copy to .env and edit values as needed.", path);
        }
    }
    Ok(())
}
