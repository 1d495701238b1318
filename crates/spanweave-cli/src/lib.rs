// NOTE: Session reconstruction runs entirely in memory.
//
// Every command re-reads the export and rebuilds sessions from scratch. Exports
// are append-only snapshots, so there is no index to keep in sync and a fixed
// heuristic never leaves stale groupings behind.

mod args;
mod commands;
pub mod config;
pub mod context;
pub mod export;
mod handlers;
pub mod logging;
pub mod presentation;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
