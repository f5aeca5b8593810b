#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::process::{Command, Output};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use etu::error::{JournalError, Result};
use etu::remote::{ContentPage, NewNote, NoteRecord, NoteService, Verification};
use etu::types::UserId;
use jiff::{SignedDuration, Timestamp};
use serde_json::json;
use tempfile::TempDir;

pub const USER: &str = "user-1";

pub fn timestamp(minutes: i64) -> Timestamp {
    let base: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
    base.checked_add(SignedDuration::from_mins(minutes)).unwrap()
}

pub fn note(id: &str, body: &str, minutes: i64) -> NoteRecord {
    NoteRecord {
        id: id.to_string(),
        content: body.to_string(),
        tags: vec![],
        created_at: timestamp(minutes),
        images: vec![],
        audios: vec![],
    }
}

/// In-memory note store with injectable latency and failures.
#[derive(Default)]
pub struct FakeNoteService {
    notes: Mutex<Vec<NoteRecord>>,
    /// Bodies split into pages; each page is a list of fragments.
    pages: Mutex<HashMap<String, Vec<Vec<String>>>>,
    /// Pages that claim more content but carry no cursor.
    broken_cursor: HashSet<String>,
    latency: HashMap<String, Duration>,
    failing: HashSet<String>,
    verify_latency: Duration,
    verification: Option<Verification>,
    verify_error: bool,
    no_search: bool,
    pub verify_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub last_list_limit: AtomicUsize,
}

impl FakeNoteService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note whose body is served as a single page.
    pub fn with_note(self, id: &str, body: &str, minutes: i64) -> Self {
        self.with_paged_note(id, body, minutes, vec![vec![body.to_string()]])
    }

    pub fn with_paged_note(
        self,
        id: &str,
        preview: &str,
        minutes: i64,
        pages: Vec<Vec<String>>,
    ) -> Self {
        self.notes.lock().unwrap().push(note(id, preview, minutes));
        self.pages.lock().unwrap().insert(id.to_string(), pages);
        self
    }

    /// Add `n` notes `n0..n{n-1}`, oldest first.
    pub fn with_notes(mut self, n: usize) -> Self {
        for i in 0..n {
            self = self.with_note(&format!("n{i}"), &format!("entry number {i}"), i as i64);
        }
        self
    }

    pub fn with_broken_cursor(mut self, id: &str) -> Self {
        self.broken_cursor.insert(id.to_string());
        self
    }

    pub fn with_latency(mut self, id: &str, latency: Duration) -> Self {
        self.latency.insert(id.to_string(), latency);
        self
    }

    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn with_verification(mut self, valid: bool, user_id: &str) -> Self {
        self.verification = Some(Verification {
            valid,
            user_id: user_id.to_string(),
        });
        self
    }

    pub fn with_unreachable_verify(mut self) -> Self {
        self.verify_error = true;
        self
    }

    pub fn with_verify_latency(mut self, latency: Duration) -> Self {
        self.verify_latency = latency;
        self
    }

    pub fn without_search(mut self) -> Self {
        self.no_search = true;
        self
    }

    /// Calls that touch entries, as opposed to the credential check.
    pub fn entry_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.get_calls.load(Ordering::SeqCst)
            + self.page_calls.load(Ordering::SeqCst)
    }

    async fn delay(&self, id: &str) {
        if let Some(latency) = self.latency.get(id) {
            tokio::time::sleep(*latency).await;
        }
    }

    fn check_user(user: &UserId) -> Result<()> {
        if user.as_str() == USER {
            Ok(())
        } else {
            Err(JournalError::Auth(format!("unknown user {user}")))
        }
    }
}

impl NoteService for FakeNoteService {
    async fn verify_credential(&self) -> Result<Verification> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if !self.verify_latency.is_zero() {
            tokio::time::sleep(self.verify_latency).await;
        }
        if self.verify_error {
            return Err(JournalError::Transport("connection refused".to_string()));
        }
        Ok(self.verification.clone().unwrap_or(Verification {
            valid: true,
            user_id: USER.to_string(),
        }))
    }

    async fn list_notes(
        &self,
        user: &UserId,
        limit: usize,
        query: Option<&str>,
    ) -> Result<Vec<NoteRecord>> {
        Self::check_user(user)?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.last_list_limit.store(limit, Ordering::SeqCst);
        let mut notes: Vec<NoteRecord> = self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| query.is_none_or(|q| n.content.contains(q)))
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notes.truncate(limit);
        Ok(notes)
    }

    async fn get_note(&self, user: &UserId, id: &str) -> Result<serde_json::Value> {
        Self::check_user(user)?;
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.delay(id).await;
        if self.failing.contains(id) {
            return Err(JournalError::Transport(format!(
                "connection reset fetching {id}"
            )));
        }
        let notes = self.notes.lock().unwrap();
        let note = notes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))?;
        Ok(json!({
            "id": note.id,
            "tags": note.tags,
            "created_at": note.created_at.to_string(),
            "images": [],
            "audios": [],
        }))
    }

    async fn content_page(
        &self,
        user: &UserId,
        id: &str,
        cursor: Option<&str>,
    ) -> Result<ContentPage> {
        Self::check_user(user)?;
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let pages = self.pages.lock().unwrap();
        let pages = pages
            .get(id)
            .ok_or_else(|| JournalError::NotFound(id.to_string()))?;
        let index: usize = match cursor {
            None => 0,
            Some(c) => c
                .parse()
                .map_err(|_| JournalError::Api(format!("400: bad cursor {c}")))?,
        };
        let has_more = index + 1 < pages.len();
        let next_cursor = if self.broken_cursor.contains(id) {
            None
        } else {
            has_more.then(|| (index + 1).to_string())
        };
        Ok(ContentPage {
            fragments: pages.get(index).cloned().unwrap_or_default(),
            next_cursor,
            has_more,
        })
    }

    async fn create_note(&self, user: &UserId, new: &NewNote) -> Result<NoteRecord> {
        Self::check_user(user)?;
        let mut notes = self.notes.lock().unwrap();
        let mut record = note(&format!("created-{}", notes.len()), &new.content, 10_000);
        record.tags = new.tags.clone();
        notes.push(record.clone());
        Ok(record)
    }

    async fn delete_note(&self, user: &UserId, id: &str) -> Result<()> {
        Self::check_user(user)?;
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(JournalError::NotFound("notes".to_string()));
        }
        Ok(())
    }

    fn supports_search(&self) -> bool {
        !self.no_search
    }
}

/// Runs the etu binary against isolated config and cache directories.
pub struct EtuTest {
    pub config_dir: TempDir,
    pub cache_dir: TempDir,
}

impl EtuTest {
    pub fn new() -> Self {
        EtuTest {
            config_dir: TempDir::new().expect("Failed to create temp directory"),
            cache_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_etu"))
            .args(args)
            .env("ETU_CONFIG_DIR", self.config_dir.path())
            .env("ETU_CACHE_DIR", self.cache_dir.path())
            .env_remove("ETU_API_KEY")
            .env_remove("ETU_TARGET")
            .env_remove("ETU_LOG")
            .env_remove("OPENAI_API_KEY")
            .output()
            .expect("Failed to execute etu command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}
