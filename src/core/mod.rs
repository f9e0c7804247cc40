//! Core types shared across the codebase.

mod context;
mod state;

pub use context::BuildContext;
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
