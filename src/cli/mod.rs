//! Command-Line Interface
//!
//! Command implementations and terminal output helpers. Argument parsing
//! lives in `main.rs`; each command here exposes a `run` (or a small set
//! of named entry points) that does the actual work.

pub mod commands;
pub mod ui;
pub mod util;

pub use ui::Output;
