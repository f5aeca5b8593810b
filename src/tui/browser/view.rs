//! Rendering of [`BrowserState`] with ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::display::summary_line;

use super::model::{BrowserState, Flow, Phase};

pub const NO_ENTRIES: &str = "No entries found.";

fn loading_message(flow: Flow) -> &'static str {
    match flow {
        Flow::List => "Loading journal entries...",
        Flow::Search => "Searching...",
    }
}

fn help_line(state: &BrowserState) -> &'static str {
    match state.phase() {
        Phase::EnteringQuery => "enter: search  esc: quit",
        Phase::Loading => "q: quit",
        Phase::ShowingResults if state.filter_focused() => {
            "type to filter  enter: done  esc: clear"
        }
        Phase::ShowingResults => "↑/↓: move  enter: select  /: filter  q: quit",
        Phase::ShowingError(_) => "enter/q: quit",
        Phase::Selected(_) | Phase::Cancelled => "",
    }
}

/// Draw the whole browser into `frame`.
pub fn render(frame: &mut Frame, state: &BrowserState) {
    let area = frame.area();
    let height = (state.frame_height() as u16).min(area.height);
    let area = Rect { height, ..area };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        state.title().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, chunks[0]);

    let block = Block::default().borders(Borders::ALL);
    match state.phase() {
        Phase::EnteringQuery => {
            let input = Paragraph::new(format!("Search: {}█", state.query())).block(block);
            frame.render_widget(input, chunks[1]);
        }
        Phase::Loading => {
            let text = format!("{} {}", state.spinner(), loading_message(state.flow()));
            frame.render_widget(Paragraph::new(text).block(block), chunks[1]);
        }
        Phase::ShowingError(message) => {
            let text = Paragraph::new(format!("Error: {message}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(text, chunks[1]);
        }
        Phase::ShowingResults | Phase::Selected(_) | Phase::Cancelled => {
            render_results(frame, state, block, chunks[1]);
        }
    }

    if state.filter_focused() || !state.filter().is_empty() {
        let filter = Paragraph::new(format!(
            "/{} ({}/{})",
            state.filter(),
            state.visible().len(),
            state.total_results()
        ));
        frame.render_widget(filter, chunks[2]);
    }

    let help = Paragraph::new(help_line(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn render_results(frame: &mut Frame, state: &BrowserState, block: Block, area: Rect) {
    if state.visible().is_empty() {
        frame.render_widget(Paragraph::new(NO_ENTRIES).block(block), area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = state
        .visible()
        .iter()
        .enumerate()
        .skip(state.scroll_offset())
        .take(state.viewport_rows())
        .map(|(i, entry)| {
            let line = summary_line(entry, width);
            if i == state.selected_index() {
                ListItem::new(format!("> {line}")).style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(format!("  {line}"))
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
