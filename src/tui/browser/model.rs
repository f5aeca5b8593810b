//! Pure browser state machine.
//!
//! All browser behaviour is expressed as [`update`], which takes the current
//! state and one message and returns the next state plus the side effects
//! (intents) the runtime should perform. Nothing here touches the terminal or
//! the network, so every transition can be unit tested directly.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::Result;
use crate::search::SearchIndex;
use crate::types::Entry;

/// Most result rows shown at once.
pub const MAX_VISIBLE_ROWS: usize = 10;
/// Fewest result rows shown, even with no results.
pub const MIN_VISIBLE_ROWS: usize = 1;
/// Rows taken by the title, borders, filter line and help line.
pub const CHROME_ROWS: usize = 6;

pub const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Which workflow the browser is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Load immediately and show recent entries.
    List,
    /// Ask for a query first, then load matching entries.
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    EnteringQuery,
    Loading,
    ShowingResults,
    ShowingError(String),
    Selected(Arc<Entry>),
    Cancelled,
}

/// A request for the runtime to load entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: u64,
    pub limit: usize,
    pub query: Option<String>,
}

/// Inputs to the state machine.
#[derive(Debug)]
pub enum Msg {
    Tick,
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Loaded {
        request_id: u64,
        outcome: Result<Vec<Entry>>,
    },
}

/// Side effects requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    StartLoad(LoadRequest),
    CancelLoad(u64),
    Quit,
}

/// Abstract user actions, decoupled from concrete key bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    Quit,
    InsertChar(char),
    DeleteChar,
    Submit,
    Select,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    FocusFilter,
    LeaveFilter,
    ClearFilter,
}

#[derive(Debug, Clone)]
pub struct BrowserState {
    flow: Flow,
    title: String,
    limit: usize,
    phase: Phase,
    query: String,
    filter: String,
    filter_focused: bool,
    index: SearchIndex<Entry>,
    visible: Vec<Arc<Entry>>,
    selected: usize,
    scroll: usize,
    spinner_frame: usize,
    terminal_size: Option<(u16, u16)>,
    pending: Option<u64>,
    next_request_id: u64,
}

impl BrowserState {
    pub fn new(flow: Flow, title: impl Into<String>, limit: usize) -> Self {
        let phase = match flow {
            Flow::List => Phase::Loading,
            Flow::Search => Phase::EnteringQuery,
        };
        Self {
            flow,
            title: title.into(),
            limit,
            phase,
            query: String::new(),
            filter: String::new(),
            filter_focused: false,
            index: SearchIndex::default(),
            visible: Vec::new(),
            selected: 0,
            scroll: 0,
            spinner_frame: 0,
            terminal_size: None,
            pending: None,
            next_request_id: 0,
        }
    }

    /// Pre-fill the search input.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Initial intents. The list flow starts loading right away.
    pub fn start(mut self) -> (Self, Vec<Intent>) {
        match self.flow {
            Flow::List => {
                let intent = self.begin_load(None);
                (self, vec![intent])
            }
            Flow::Search => (self, Vec::new()),
        }
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn filter_focused(&self) -> bool {
        self.filter_focused
    }

    pub fn visible(&self) -> &[Arc<Entry>] {
        &self.visible
    }

    pub fn total_results(&self) -> usize {
        self.index.len()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner_frame
    }

    pub fn pending_request(&self) -> Option<u64> {
        self.pending
    }

    /// True once the browser has reached `Selected` or `Cancelled`.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Selected(_) | Phase::Cancelled)
    }

    /// The chosen entry, if the browser finished with a selection.
    pub fn selection(&self) -> Option<Arc<Entry>> {
        match &self.phase {
            Phase::Selected(entry) => Some(Arc::clone(entry)),
            _ => None,
        }
    }

    /// Number of result rows to draw.
    pub fn viewport_rows(&self) -> usize {
        let rows = self
            .visible
            .len()
            .clamp(MIN_VISIBLE_ROWS, MAX_VISIBLE_ROWS);
        match self.terminal_size {
            Some((_, height)) => {
                let available = (height as usize).saturating_sub(CHROME_ROWS);
                rows.min(available.max(MIN_VISIBLE_ROWS))
            }
            None => rows,
        }
    }

    /// Total rows the browser occupies, chrome included.
    pub fn frame_height(&self) -> usize {
        self.viewport_rows() + CHROME_ROWS
    }

    fn begin_load(&mut self, query: Option<String>) -> Intent {
        self.next_request_id += 1;
        let request = LoadRequest {
            id: self.next_request_id,
            limit: self.limit,
            query,
        };
        self.pending = Some(request.id);
        self.phase = Phase::Loading;
        self.spinner_frame = 0;
        Intent::StartLoad(request)
    }

    fn set_results(&mut self, entries: Vec<Entry>) {
        self.index = SearchIndex::build(entries);
        self.filter.clear();
        self.filter_focused = false;
        self.visible = self.index.entries();
        self.selected = 0;
        self.scroll = 0;
        if self.flow == Flow::Search {
            self.title = format!("Search Results ({})", self.index.len());
        }
        self.phase = Phase::ShowingResults;
    }

    fn refilter(&mut self) {
        self.visible = self.index.search(&self.filter);
        self.selected = 0;
        self.scroll = 0;
    }

    fn quit(&mut self, intents: &mut Vec<Intent>) {
        if let Some(id) = self.pending.take() {
            intents.push(Intent::CancelLoad(id));
        }
        self.phase = Phase::Cancelled;
        intents.push(Intent::Quit);
    }

    fn move_selection(&mut self, target: usize) {
        let count = self.visible.len();
        if count == 0 {
            return;
        }
        self.selected = target.min(count - 1);
        self.scroll = adjust_scroll(self.scroll, self.selected, self.viewport_rows());
    }
}

/// Calculate the scroll offset that keeps `selected_index` visible.
pub fn adjust_scroll(scroll_offset: usize, selected_index: usize, list_height: usize) -> usize {
    if list_height == 0 {
        return 0;
    }
    if selected_index < scroll_offset {
        return selected_index;
    }
    if selected_index >= scroll_offset + list_height {
        return selected_index.saturating_sub(list_height - 1);
    }
    scroll_offset
}

/// Map a key press to an action for the current state.
///
/// Returns `None` if the key means nothing here.
pub fn key_to_action(key: &KeyEvent, state: &BrowserState) -> Option<BrowserAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(BrowserAction::Quit),
            _ => None,
        };
    }

    match &state.phase {
        Phase::EnteringQuery => match key.code {
            KeyCode::Esc => Some(BrowserAction::Quit),
            KeyCode::Enter => Some(BrowserAction::Submit),
            KeyCode::Backspace => Some(BrowserAction::DeleteChar),
            KeyCode::Char(c) => Some(BrowserAction::InsertChar(c)),
            _ => None,
        },
        Phase::Loading | Phase::ShowingError(_) => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(BrowserAction::Quit),
            KeyCode::Enter if matches!(state.phase, Phase::ShowingError(_)) => {
                Some(BrowserAction::Quit)
            }
            _ => None,
        },
        Phase::ShowingResults if state.filter_focused => match key.code {
            KeyCode::Esc => Some(BrowserAction::ClearFilter),
            KeyCode::Enter => Some(BrowserAction::LeaveFilter),
            KeyCode::Backspace => Some(BrowserAction::DeleteChar),
            KeyCode::Up => Some(BrowserAction::MoveUp),
            KeyCode::Down => Some(BrowserAction::MoveDown),
            KeyCode::Char(c) => Some(BrowserAction::InsertChar(c)),
            _ => None,
        },
        Phase::ShowingResults => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(BrowserAction::Quit),
            KeyCode::Enter => Some(BrowserAction::Select),
            KeyCode::Up | KeyCode::Char('k') => Some(BrowserAction::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(BrowserAction::MoveDown),
            KeyCode::PageUp => Some(BrowserAction::PageUp),
            KeyCode::PageDown => Some(BrowserAction::PageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(BrowserAction::GoToTop),
            KeyCode::End | KeyCode::Char('G') => Some(BrowserAction::GoToBottom),
            KeyCode::Char('/') => Some(BrowserAction::FocusFilter),
            _ => None,
        },
        Phase::Selected(_) | Phase::Cancelled => None,
    }
}

fn apply_action(state: &mut BrowserState, action: BrowserAction, intents: &mut Vec<Intent>) {
    match action {
        BrowserAction::Quit => state.quit(intents),
        BrowserAction::InsertChar(c) => match state.phase {
            Phase::EnteringQuery => state.query.push(c),
            Phase::ShowingResults if state.filter_focused => {
                state.filter.push(c);
                state.refilter();
            }
            _ => {}
        },
        BrowserAction::DeleteChar => match state.phase {
            Phase::EnteringQuery => {
                state.query.pop();
            }
            Phase::ShowingResults if state.filter_focused => {
                if state.filter.pop().is_some() {
                    state.refilter();
                }
            }
            _ => {}
        },
        BrowserAction::Submit => {
            if state.phase == Phase::EnteringQuery {
                let query = state.query.trim();
                let query = (!query.is_empty()).then(|| query.to_string());
                intents.push(state.begin_load(query));
            }
        }
        BrowserAction::Select => {
            if state.phase != Phase::ShowingResults || state.filter_focused {
                return;
            }
            match state.visible.get(state.selected).cloned() {
                Some(entry) => {
                    state.phase = Phase::Selected(entry);
                    intents.push(Intent::Quit);
                }
                // Nothing to pick: Enter just closes the browser.
                None => state.quit(intents),
            }
        }
        BrowserAction::MoveUp => state.move_selection(state.selected.saturating_sub(1)),
        BrowserAction::MoveDown => state.move_selection(state.selected + 1),
        BrowserAction::PageUp => {
            let page = state.viewport_rows();
            state.move_selection(state.selected.saturating_sub(page));
        }
        BrowserAction::PageDown => {
            let page = state.viewport_rows();
            state.move_selection(state.selected + page);
        }
        BrowserAction::GoToTop => state.move_selection(0),
        BrowserAction::GoToBottom => state.move_selection(usize::MAX),
        BrowserAction::FocusFilter => {
            if state.phase == Phase::ShowingResults {
                state.filter_focused = true;
            }
        }
        BrowserAction::LeaveFilter => state.filter_focused = false,
        BrowserAction::ClearFilter => {
            state.filter_focused = false;
            if !state.filter.is_empty() {
                state.filter.clear();
                state.refilter();
            }
        }
    }
}

/// Advance the browser by one message.
pub fn update(mut state: BrowserState, msg: Msg) -> (BrowserState, Vec<Intent>) {
    let mut intents = Vec::new();
    if state.is_finished() {
        return (state, intents);
    }

    match msg {
        Msg::Tick => {
            if state.phase == Phase::Loading {
                state.spinner_frame = (state.spinner_frame + 1) % SPINNER_FRAMES.len();
            }
        }
        Msg::Resize { width, height } => {
            state.terminal_size = Some((width, height));
            state.scroll = adjust_scroll(state.scroll, state.selected, state.viewport_rows());
        }
        Msg::Loaded {
            request_id,
            outcome,
        } => {
            if state.pending != Some(request_id) || state.phase != Phase::Loading {
                tracing::debug!(request_id, "ignoring stale load result");
                return (state, intents);
            }
            state.pending = None;
            match outcome {
                Ok(entries) => state.set_results(entries),
                Err(e) => state.phase = Phase::ShowingError(e.to_string()),
            }
        }
        Msg::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return (state, intents);
            }
            if let Some(action) = key_to_action(&key, &state) {
                apply_action(&mut state, action, &mut intents);
            }
        }
    }

    (state, intents)
}
