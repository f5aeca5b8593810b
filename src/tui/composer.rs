//! Multi-line composer for new entries.
//!
//! Ctrl+D saves, Esc or Ctrl+C cancels. Enter inserts a line break.

use std::io;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::error::Result;

use super::input::{CrosstermEvents, EventSource};
use super::terminal::TerminalGuard;

pub const PLACEHOLDER: &str = "What are you working on? (ctrl+d to save, ctrl+c to quit)";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerStep {
    Continue,
    Save,
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct ComposerState {
    text: String,
}

impl ComposerState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerStep {
        if key.kind != KeyEventKind::Press {
            return ComposerStep::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('d') => ComposerStep::Save,
                KeyCode::Char('c') => ComposerStep::Cancel,
                _ => ComposerStep::Continue,
            };
        }
        match key.code {
            KeyCode::Esc => return ComposerStep::Cancel,
            KeyCode::Enter => self.text.push('\n'),
            KeyCode::Tab => self.text.push('\t'),
            KeyCode::Backspace => {
                self.text.pop();
            }
            KeyCode::Char(c) => self.text.push(c),
            _ => {}
        }
        ComposerStep::Continue
    }
}

pub fn render(frame: &mut Frame, state: &ComposerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let block = Block::default().borders(Borders::ALL).title("New entry");
    let body = if state.text.is_empty() {
        Paragraph::new(PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(format!("{}█", state.text))
    };
    frame.render_widget(body.wrap(Wrap { trim: false }).block(block), chunks[0]);

    let help = Paragraph::new("ctrl+d: save  esc/ctrl+c: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[1]);
}

/// Feed events into the composer until it saves or cancels.
///
/// Returns the trimmed text on save, or `None` on cancel or when nothing was
/// written.
pub fn drive<E, F>(events: &mut E, mut draw: F) -> Result<Option<String>>
where
    E: EventSource + ?Sized,
    F: FnMut(&ComposerState) -> Result<()>,
{
    let mut state = ComposerState::default();
    draw(&state)?;
    loop {
        let Some(event) = events.poll(POLL_INTERVAL)? else {
            continue;
        };
        let step = match event {
            Event::Key(key) => state.handle_key(key),
            Event::Paste(text) => {
                state.text.push_str(&text);
                ComposerStep::Continue
            }
            _ => ComposerStep::Continue,
        };
        match step {
            ComposerStep::Continue => draw(&state)?,
            ComposerStep::Cancel => return Ok(None),
            ComposerStep::Save => {
                let text = state.text.trim();
                return Ok((!text.is_empty()).then(|| text.to_string()));
            }
        }
    }
}

/// Open the composer on the terminal.
pub fn compose() -> Result<Option<String>> {
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let result = drive(&mut CrosstermEvents, |state| {
        terminal.draw(|frame| render(frame, state))?;
        Ok(())
    });
    drop(terminal);
    guard.restore()?;
    result
}
