//! Update-request text protocol.
//!
//! An operator writes `"<client-name> <usecase-index>"` into the shared
//! `update-request` file. The first client, in registration order, whose name
//! occurs in the input is switched to the given usecase.
mod parser;
pub use parser::*;
