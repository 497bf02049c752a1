// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use log::error;

use cariledger::{cli, commands, config::Config, logging, Ledger, LedgerError};

fn main() {
    if let Err(err) = run() {
        let code = match err.downcast_ref::<LedgerError>() {
            Some(LedgerError::Validation(_)) | Some(LedgerError::NotFound { .. }) => 2,
            Some(LedgerError::TransientStorage(_)) => 3,
            _ => 1,
        };
        error!("event=app_exit module=main status=error error={:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::from_matches(&matches)?;
    let _logger = logging::init_logging(&cfg.log_level)?;
    let ledger = Ledger::open(&cfg)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.db_path.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&ledger, sub)?,
        Some(("project", sub)) => commands::projects::handle(&ledger, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&ledger, sub)?,
        Some(("report", sub)) => commands::reports::handle(&ledger, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&ledger, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&ledger)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    ledger.close()?;
    Ok(())
}
