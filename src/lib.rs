//! Automatic git synchronization library.
//!
//! This crate runs a fixed sequence against one working tree:
//! - Checking out the main branch
//! - Pulling from origin
//! - Staging every change
//! - Committing with a timestamped message
//! - Pushing back to origin
//!
//! A failing command does not stop the sequence unless the halt policy is chosen.

pub mod config;
pub mod constants;
pub mod git;
pub mod message;
pub mod output;
pub mod sync;
