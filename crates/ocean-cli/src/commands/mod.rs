//! CLI command implementations.
//!
//! - [`action`] - Get, list and wait on actions

pub mod action;

pub use action::ActionCommand;
