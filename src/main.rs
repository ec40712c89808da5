use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::io;
use timeshelf::cli::Cli;
use timeshelf::commands::{self, Session, TerminalPrompt};
use timeshelf::config::Settings;
use timeshelf::logging;
use timeshelf::persistence::{app_data_dir, LedgerStore};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load()?;
    if let Err(e) = logging::init(logging::GT_PREFIX, &app_data_dir()?, &settings.log_level, cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let store = LedgerStore::new(settings.ledger_file(cli.config.as_deref())?);
    let ledger = store.load()?;
    debug!(path = %store.path().display(), entries = ledger.entries.len(), "ledger loaded");

    let mut prompt = TerminalPrompt;
    let mut stdout = io::stdout();
    let mut session = Session::new(ledger, Local::now(), &mut prompt, &mut stdout);
    session.verbose = cli.verbose;

    commands::run(&mut session, cli.command)?;

    if session.is_dirty() {
        store.save(&session.ledger)?;
        if cli.verbose {
            println!("Config saved to: {}", store.path().display());
        }
    }
    Ok(())
}
