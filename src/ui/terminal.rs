use crate::input::Flow;
use anyhow::{bail, Result};
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, IsTerminal};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A full-screen widget driven one key press at a time
pub trait Interactive {
    type Output;

    fn draw(&self, f: &mut Frame);
    fn on_key(&mut self, key: KeyEvent) -> Flow<Self::Output>;
}

/// Run `widget` until it finishes; `None` means the user cancelled
pub fn run_interactive<W: Interactive>(widget: &mut W) -> Result<Option<W::Output>> {
    if !io::stdin().is_terminal() {
        bail!("Interactive prompts need a terminal; pass the arguments explicitly");
    }

    let _screen = crate::logging::hold_screen();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, widget);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<W: Interactive>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    widget: &mut W,
) -> Result<Option<W::Output>> {
    loop {
        terminal.draw(|f| widget.draw(f))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press {
                    match widget.on_key(key) {
                        Flow::Continue => {}
                        Flow::Done(output) => return Ok(Some(output)),
                        Flow::Cancelled => return Ok(None),
                    }
                }
            }
        }
    }
}
