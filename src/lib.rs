//! patentdesk: patent portfolio desk with session login, catalog filtering and a session log.

mod cli;
pub mod icons;
pub mod patentdesk_core;
pub mod patentdesk_tui;

pub use cli::{run, DynError};
