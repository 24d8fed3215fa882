//! CLI command implementations

pub mod client;
pub mod deployment;
pub mod init;
pub mod migrate;
pub mod options;
pub mod platform;
pub mod sandbox;
pub mod validate;
