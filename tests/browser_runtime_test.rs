mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use common::FakeNoteService;
use crossterm::event::{KeyCode, KeyEvent};
use etu::error::Result;
use etu::remote::Gateway;
use etu::tui::browser::{
    BrowserRuntime, BrowserState, EntryLoader, Flow, GatewayLoader, LoadRequest, Msg, Phase,
};
use etu::types::Entry;

fn key(code: KeyCode) -> Msg {
    Msg::Key(KeyEvent::from(code))
}

/// Loader that never finishes and records when its future is dropped.
struct StuckLoader {
    started: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl EntryLoader for StuckLoader {
    async fn load(&self, _request: &LoadRequest) -> Result<Vec<Entry>> {
        let _flag = DropFlag(Arc::clone(&self.dropped));
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_list_loads_then_enter_selects() {
    let gateway = Arc::new(Gateway::new(FakeNoteService::new().with_notes(3)));
    let runtime = BrowserRuntime::new(Arc::new(GatewayLoader::new(gateway)))
        .with_tick_rate(Duration::from_millis(10));
    let tx = runtime.sender();

    let mut sent = false;
    let state = runtime
        .run(BrowserState::new(Flow::List, "Journal", 10), |s| {
            if *s.phase() == Phase::ShowingResults && !sent {
                sent = true;
                tx.send(key(KeyCode::Down)).unwrap();
                tx.send(key(KeyCode::Enter)).unwrap();
            }
            Ok(())
        })
        .await
        .unwrap();

    let selected = state.selection().expect("an entry was selected");
    assert_eq!(selected.id, "n1");
    assert_eq!(selected.body, "entry number 1");
}

#[tokio::test]
async fn test_quit_while_loading_cancels_the_load() {
    let started = Arc::new(AtomicBool::new(false));
    let dropped = Arc::new(AtomicBool::new(false));
    let loader = Arc::new(StuckLoader {
        started: Arc::clone(&started),
        dropped: Arc::clone(&dropped),
    });
    let runtime = BrowserRuntime::new(loader).with_tick_rate(Duration::from_millis(5));
    let tx = runtime.sender();

    let renders = AtomicUsize::new(0);
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        runtime.run(BrowserState::new(Flow::List, "Journal", 10), |s| {
            // Give the load a few ticks to get going before quitting.
            if *s.phase() == Phase::Loading && renders.fetch_add(1, Ordering::SeqCst) == 3 {
                tx.send(key(KeyCode::Char('q'))).unwrap();
            }
            Ok(())
        }),
    )
    .await
    .expect("browser did not exit")
    .unwrap();

    assert_eq!(*state.phase(), Phase::Cancelled);
    assert!(state.selection().is_none());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(started.load(Ordering::SeqCst));
    assert!(dropped.load(Ordering::SeqCst), "load task was not aborted");
}

#[tokio::test]
async fn test_fetch_failure_shows_error() {
    let gateway = Arc::new(Gateway::new(
        FakeNoteService::new().with_notes(3).failing_on("n1"),
    ));
    let runtime = BrowserRuntime::new(Arc::new(GatewayLoader::new(gateway)));
    let tx = runtime.sender();

    let mut error = None;
    let state = runtime
        .run(BrowserState::new(Flow::List, "Journal", 10), |s| {
            if let Phase::ShowingError(message) = s.phase()
                && error.is_none()
            {
                error = Some(message.clone());
                tx.send(key(KeyCode::Enter)).unwrap();
            }
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(*state.phase(), Phase::Cancelled);
    let error = error.expect("error was rendered");
    assert!(error.contains("n1"), "{error}");
}

#[tokio::test]
async fn test_search_submits_query_and_retitles() {
    let gateway = Arc::new(Gateway::new(
        FakeNoteService::new()
            .with_note("a", "walked the dog", 1)
            .with_note("b", "fixed the build", 2),
    ));
    let runtime = BrowserRuntime::new(Arc::new(GatewayLoader::new(gateway)));
    let tx = runtime.sender();

    let mut typed = false;
    let mut title = String::new();
    let state = runtime
        .run(BrowserState::new(Flow::Search, "Search", 10), |s| {
            match s.phase() {
                Phase::EnteringQuery if !typed => {
                    typed = true;
                    for c in "build".chars() {
                        tx.send(key(KeyCode::Char(c))).unwrap();
                    }
                    tx.send(key(KeyCode::Enter)).unwrap();
                }
                Phase::ShowingResults if title.is_empty() => {
                    title = s.title().to_string();
                    tx.send(key(KeyCode::Enter)).unwrap();
                }
                _ => {}
            }
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(title, "Search Results (1)");
    assert_eq!(state.selection().unwrap().id, "b");
}

#[tokio::test]
async fn test_empty_store_then_enter_closes() {
    let gateway = Arc::new(Gateway::new(FakeNoteService::new()));
    let runtime = BrowserRuntime::new(Arc::new(GatewayLoader::new(gateway)));
    let tx = runtime.sender();

    let mut seen_empty = false;
    let state = runtime
        .run(BrowserState::new(Flow::List, "Journal", 10), |s| {
            if *s.phase() == Phase::ShowingResults && !seen_empty {
                seen_empty = s.visible().is_empty();
                tx.send(key(KeyCode::Enter)).unwrap();
            }
            Ok(())
        })
        .await
        .unwrap();

    assert!(seen_empty);
    assert!(state.selection().is_none());
}
