pub mod app;
pub mod ui;

use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use crate::clock::Clock;
use crate::store::{Routine, TaskRepository};
use app::{App, InputMode};
use ui::ui;

pub fn run_tui<R: TaskRepository, C: Clock>(routine: Routine<R, C>) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(routine);

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend, R: TaskRepository, C: Clock>(terminal: &mut Terminal<B>, app: &mut App<R, C>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Countdowns move with the clock, so redraw at least every few seconds.
        if !event::poll(std::time::Duration::from_secs(5))? {
            app.reload();
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.input_mode {
                InputMode::Normal => {
                    app.message = None;
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Down | KeyCode::Char('j') => app.next(),
                        KeyCode::Up | KeyCode::Char('k') => app.previous(),
                        KeyCode::Char(' ') => app.toggle_selected(),
                        KeyCode::Char('p') => app.pin_selected(),
                        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                        KeyCode::Char('a') => app.start_add(),
                        KeyCode::Char('f') => app.cycle_filter(),
                        KeyCode::Char('r') => app.reset_completions(),
                        KeyCode::Char('X') => app.start_clear(),
                        KeyCode::Char('v') => app.toggle_view(),
                        KeyCode::Enter => app.add_selected_idea(),
                        _ => {}
                    }
                }
                InputMode::Adding => match key.code {
                    KeyCode::Enter => app.handle_input(),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                },
                InputMode::ConfirmClear => app.confirm_clear(matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'))),
            }
        }
    }
}
