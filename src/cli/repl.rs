use anyhow::{Result, anyhow};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};

use crate::cli::app::{AppState, KeyOutcome, Submission};
use crate::cli::view::draw;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Leaves raw mode and the alternate screen, also when the loop bails out.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

pub async fn run_repl(state: &mut AppState) -> Result<()> {
    enable_raw_mode().map_err(|err| anyhow!("Failed to enable raw terminal mode: {err}"))?;
    let guard = TerminalGuard;
    execute!(io::stdout(), EnterAlternateScreen)
        .map_err(|err| anyhow!("Failed to enter alternate screen: {err}"))?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .map_err(|err| anyhow!("Failed to initialize terminal: {err}"))?;

    let result = event_loop(&mut terminal, state).await;

    let _ = terminal.show_cursor();
    drop(guard);
    result
}

async fn event_loop(terminal: &mut Tui, state: &mut AppState) -> Result<()> {
    loop {
        redraw(terminal, state)?;

        let event = event::read().map_err(|err| anyhow!("Failed to read terminal event: {err}"))?;
        let Event::Key(key) = event else {
            continue;
        };

        let line = match state.handle_key(key) {
            KeyOutcome::Continue => continue,
            KeyOutcome::Quit => break,
            KeyOutcome::Submit(line) => line,
        };

        match state.submit_line(&line) {
            Submission::Handled => {}
            Submission::Quit => break,
            Submission::Prompt(pending) => {
                // Show the in-flight turn before blocking on the provider.
                redraw(terminal, state)?;
                state.complete_prompt(pending).await;
            }
        }
    }

    Ok(())
}

fn redraw(terminal: &mut Tui, state: &AppState) -> Result<()> {
    terminal
        .draw(|frame| draw(frame, state))
        .map_err(|err| anyhow!("Failed to draw terminal frame: {err}"))?;
    Ok(())
}
