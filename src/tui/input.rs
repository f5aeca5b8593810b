//! Blocking terminal input for the synchronous screens (composer, viewer).

use std::time::Duration;

use crossterm::event::{self, Event};

use crate::error::Result;

pub trait EventSource {
    /// Wait up to `timeout` for the next event.
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}
