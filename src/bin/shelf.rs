use anyhow::Result;
use clap::Parser;
use std::io;
use timeshelf::config::Settings;
use timeshelf::logging;
use timeshelf::persistence::app_data_dir;
use timeshelf::shelf::{actions, ShelfCli, ShelfSession, ShelfStore, TerminalHost};
use tracing::debug;

fn main() -> Result<()> {
    let cli = ShelfCli::parse();

    let settings = Settings::load()?;
    if let Err(e) = logging::init(logging::SHELF_PREFIX, &app_data_dir()?, &settings.log_level, cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let store = ShelfStore::new(settings.shelf_file(cli.config.as_deref())?);
    let shelf = store.load()?;
    debug!(path = %store.path().display(), commands = shelf.commands.len(), "shelf loaded");

    let mut host = TerminalHost {
        editor: settings.editor_command(),
    };
    let mut stdout = io::stdout();
    let mut session = ShelfSession::new(shelf, &mut host, &mut stdout);
    if let Some(confirm) = settings.confirm_before_run {
        session.confirm_before_run = confirm;
    }

    actions::run(&mut session, cli.command)?;

    if session.is_dirty() {
        store.save(&session.shelf)?;
        if cli.verbose {
            println!("Shelf saved to: {}", store.path().display());
        }
    }
    Ok(())
}
