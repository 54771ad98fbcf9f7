pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod state;
pub mod sync;
pub mod tui;
