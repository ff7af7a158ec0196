//! Live registries read and mutated by the inspection surface: client vote
//! records, fabric commit snapshots and the consumer link walk.
mod client_registry;
mod consumer_links;
mod display_buffer;
mod fabric_registry;
pub use client_registry::*;
pub use consumer_links::*;
pub use display_buffer::*;
pub use fabric_registry::*;

#[cfg(test)]
mod client_registry_test;
