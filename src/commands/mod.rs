// src/commands/mod.rs
//! Command handlers for the aptpack CLI

mod inspect;
mod package;

pub use inspect::{cmd_inspect, cmd_show};
pub use package::cmd_package;
