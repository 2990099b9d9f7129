//! HTTP API module.
//!
//! The dashboard frontend talks to these endpoints; chart drawing stays on
//! the client.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{router, start_server, AppState};
pub use types::*;
pub use logs::*;
