//! Ambient helpers shared by the workspace crates.
//! - `utils::logging`: tracing subscriber setup
//! - `env`: filesystem sanity checks run before a store is opened

pub mod env;
pub mod utils;
