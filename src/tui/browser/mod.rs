//! Interactive entry browser used by `list`, `search`, `show` and `delete`.

pub mod model;
pub mod runtime;
pub mod view;

pub use model::{BrowserState, Flow, Intent, LoadRequest, Msg, Phase, update};
pub use runtime::{BrowserRuntime, EntryLoader, GatewayLoader, run_browser};
