//! Status Polling
//!
//! The poll-until-terminal mechanism: budgets, terminal classification,
//! and the subscription loop itself.
//!
//! ## Modules
//!
//! - `budget`: attempt/elapsed caps with a distinct timed-out outcome
//! - `terminal`: pure terminal-state predicate
//! - `subscription`: the sequential poll loop and its cancellation handle

pub mod budget;
pub mod subscription;
pub mod terminal;

pub use budget::PollBudget;
pub use subscription::{CancelToken, PollConfig, PollHandle, PollOutcome, PollSubscription};
pub use terminal::{StandardClassifier, TerminalClassifier};
