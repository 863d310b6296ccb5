pub mod app;
pub mod ui;

use std::io;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::error;

use crate::api::TaskApi;
use crate::session::SessionStore;
use app::App;
use ui::ui;

pub async fn run_tui<A: TaskApi>(api: A, session: SessionStore) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api, session);

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "TUI exited with an error");
        return Err(err.into());
    }

    Ok(())
}

/// Draw, read one key, run the resulting effect. Each effect is awaited to
/// completion before the next key is read.
async fn run_app<B: Backend, A: TaskApi>(terminal: &mut Terminal<B>, app: &mut App<A>) -> io::Result<()> {
    let mut pending = app.start();
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Some(effect) = pending.take() {
            if app.run_effect(effect).await {
                return Ok(());
            }
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                pending = app.handle_key(key);
            }
        }
    }
}
