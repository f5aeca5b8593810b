//! Scrollable read-only view of a single entry.

use std::io;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::error::Result;

use super::input::{CrosstermEvents, EventSource};
use super::terminal::TerminalGuard;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct ViewerState {
    title: String,
    lines: Vec<String>,
    scroll: usize,
    page: usize,
}

impl ViewerState {
    pub fn new(title: impl Into<String>, text: &str) -> Self {
        Self {
            title: title.into(),
            lines: text.lines().map(str::to_string).collect(),
            scroll: 0,
            page: 10,
        }
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    fn scroll_to(&mut self, target: usize) {
        self.scroll = target.min(self.max_scroll());
    }

    /// Apply a key. Returns `false` once the viewer should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return true;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => return false,
            KeyCode::Down | KeyCode::Char('j') => self.scroll_to(self.scroll + 1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_to(self.scroll.saturating_sub(1)),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_to(self.scroll + self.page),
            KeyCode::PageUp => self.scroll_to(self.scroll.saturating_sub(self.page)),
            KeyCode::Home | KeyCode::Char('g') => self.scroll_to(0),
            KeyCode::End | KeyCode::Char('G') => self.scroll_to(usize::MAX),
            _ => {}
        }
        true
    }
}

pub fn render(frame: &mut Frame, state: &mut ViewerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    state.page = chunks[0].height.saturating_sub(2).max(1) as usize;

    let text = state.lines.join("\n");
    let body = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll.min(u16::MAX as usize) as u16, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.title.clone()),
        );
    frame.render_widget(body, chunks[0]);

    let help =
        Paragraph::new("↑/↓: scroll  q: close").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[1]);
}

pub fn drive<E, F>(events: &mut E, state: &mut ViewerState, mut draw: F) -> Result<()>
where
    E: EventSource + ?Sized,
    F: FnMut(&mut ViewerState) -> Result<()>,
{
    draw(state)?;
    loop {
        match events.poll(POLL_INTERVAL)? {
            Some(Event::Key(key)) => {
                if !state.handle_key(key) {
                    return Ok(());
                }
            }
            Some(Event::Resize(_, _)) => {}
            _ => continue,
        }
        draw(state)?;
    }
}

/// Show `text` full screen until the user closes it.
pub fn view(title: &str, text: &str) -> Result<()> {
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut state = ViewerState::new(title, text);
    let result = drive(&mut CrosstermEvents, &mut state, |s| {
        terminal.draw(|frame| render(frame, s))?;
        Ok(())
    });
    drop(terminal);
    guard.restore()?;
    result
}
