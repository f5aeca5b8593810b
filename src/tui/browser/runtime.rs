//! Message loop driving the browser state machine.
//!
//! Keyboard input, resize events, ticks and load completions are all posted to
//! one queue and handed to [`update`] one at a time. Loads run as spawned
//! tasks so the loop keeps animating while the store is slow. Every task the
//! runtime spawns is aborted when the browser finishes.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::error::{JournalError, Result};
use crate::fetch::fetch_full;
use crate::remote::{Gateway, NoteService};
use crate::tui::terminal::TerminalGuard;
use crate::types::Entry;

use super::model::{BrowserState, Intent, LoadRequest, Msg, update};
use super::view;

pub const TICK_RATE: Duration = Duration::from_millis(100);

/// Loads the entries a browser shows.
pub trait EntryLoader: Send + Sync + 'static {
    fn load(&self, request: &LoadRequest) -> impl Future<Output = Result<Vec<Entry>>> + Send;
}

/// Loads previews from the gateway, then fetches every full entry.
pub struct GatewayLoader<S> {
    gateway: Arc<Gateway<S>>,
}

impl<S: NoteService> GatewayLoader<S> {
    pub fn new(gateway: Arc<Gateway<S>>) -> Self {
        Self { gateway }
    }
}

impl<S: NoteService> EntryLoader for GatewayLoader<S> {
    async fn load(&self, request: &LoadRequest) -> Result<Vec<Entry>> {
        let previews = self
            .gateway
            .list_entries(request.limit, request.query.as_deref())
            .await?;
        fetch_full(&self.gateway, &previews).await
    }
}

pub struct BrowserRuntime<L> {
    loader: Arc<L>,
    tx: UnboundedSender<Msg>,
    rx: UnboundedReceiver<Msg>,
    tick_rate: Duration,
    load: Option<(u64, JoinHandle<()>)>,
    background: Vec<JoinHandle<()>>,
}

impl<L: EntryLoader> BrowserRuntime<L> {
    pub fn new(loader: Arc<L>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            loader,
            tx,
            rx,
            tick_rate: TICK_RATE,
            load: None,
            background: Vec::new(),
        }
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// A handle for posting messages (input events) into the loop.
    pub fn sender(&self) -> UnboundedSender<Msg> {
        self.tx.clone()
    }

    /// Attach a task whose lifetime is bound to this runtime.
    pub fn attach(&mut self, task: JoinHandle<()>) {
        self.background.push(task);
    }

    fn start_load(&mut self, request: LoadRequest) {
        self.cancel_load();
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        let id = request.id;
        let handle = tokio::spawn(async move {
            let outcome = loader.load(&request).await;
            // The receiver is gone once the browser has finished.
            let _ = tx.send(Msg::Loaded {
                request_id: request.id,
                outcome,
            });
        });
        self.load = Some((id, handle));
    }

    fn cancel_load(&mut self) {
        if let Some((id, handle)) = self.load.take() {
            tracing::debug!(request_id = id, "cancelling load");
            handle.abort();
        }
    }

    fn execute(&mut self, intents: Vec<Intent>) {
        for intent in intents {
            match intent {
                Intent::StartLoad(request) => self.start_load(request),
                Intent::CancelLoad(id) => {
                    if matches!(self.load, Some((current, _)) if current == id) {
                        self.cancel_load();
                    }
                }
                // The loop checks for a finished state after every message.
                Intent::Quit => {}
            }
        }
    }

    fn shutdown(&mut self) {
        self.cancel_load();
        for task in self.background.drain(..) {
            task.abort();
        }
    }

    /// Run until the browser selects an entry or is cancelled.
    ///
    /// `render` is called with the initial state and after every message.
    pub async fn run<F>(mut self, state: BrowserState, mut render: F) -> Result<BrowserState>
    where
        F: FnMut(&BrowserState) -> Result<()>,
    {
        let ticker_tx = self.tx.clone();
        let tick_rate = self.tick_rate;
        self.attach(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if ticker_tx.send(Msg::Tick).is_err() {
                    break;
                }
            }
        }));

        let (mut state, intents) = state.start();
        self.execute(intents);

        let outcome = loop {
            if let Err(e) = render(&state) {
                break Err(e);
            }
            if state.is_finished() {
                break Ok(());
            }
            let Some(msg) = self.rx.recv().await else {
                break Err(JournalError::Other("browser message queue closed".to_string()));
            };
            let (next, intents) = update(state, msg);
            state = next;
            self.execute(intents);
        };

        self.shutdown();
        outcome.map(|()| state)
    }
}

impl<L> Drop for BrowserRuntime<L> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.load.take() {
            handle.abort();
        }
        for task in self.background.drain(..) {
            task.abort();
        }
    }
}

/// Forward terminal input and resize events into the message queue.
fn spawn_input_forwarder(tx: UnboundedSender<Msg>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(event) = events.next().await {
            let msg = match event {
                Ok(Event::Key(key)) => Msg::Key(key),
                Ok(Event::Resize(width, height)) => Msg::Resize { width, height },
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "terminal input error");
                    break;
                }
            };
            if tx.send(msg).is_err() {
                break;
            }
        }
    })
}

/// Run the browser on the real terminal and return the selected entry.
pub async fn run_browser<L: EntryLoader>(
    loader: Arc<L>,
    state: BrowserState,
) -> Result<Option<Arc<Entry>>> {
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let size = terminal.size()?;

    let mut runtime = BrowserRuntime::new(loader);
    let tx = runtime.sender();
    let _ = tx.send(Msg::Resize {
        width: size.width,
        height: size.height,
    });
    runtime.attach(spawn_input_forwarder(tx));

    let finished = runtime
        .run(state, |s| {
            terminal.draw(|frame| view::render(frame, s))?;
            Ok(())
        })
        .await;

    drop(terminal);
    guard.restore()?;
    Ok(finished?.selection())
}
