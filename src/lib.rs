//! eoscfg: Epic Online Services plugin config files
//!
//! Reads, validates, edits and migrates the JSON documents the EOS plugin
//! loads at start-up, and turns them into the options the SDK is created with.

pub mod cli;
pub mod config;
pub mod core;
pub mod json;
pub mod options;
pub mod schema;
