//! Inspection and manual vote driving for a bus bandwidth scaling subsystem.
//!
//! The crate keeps live registries of bandwidth clients and fabric commit
//! snapshots, serves them through a debug file tree, and drives a synthetic
//! shell client whose usecase index oscillates so that every operator update
//! is seen by the scaling framework as a vote change.
mod command;
mod config;
mod errors;
mod framework;
mod registry;
mod service;
mod shell_client;
mod surface;

pub mod constants;
pub mod utils;

pub use command::*;
pub use self::config::*;
pub use errors::*;
pub use framework::*;
pub use registry::*;
pub use service::*;
pub use shell_client::*;
pub use surface::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
