//! Terminal user interfaces.

pub mod browser;
pub mod composer;
pub mod input;
pub mod terminal;
pub mod viewer;
