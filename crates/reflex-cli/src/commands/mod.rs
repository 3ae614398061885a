//! Subcommand implementations

pub mod call;
pub mod classes;
pub mod create;
pub mod describe;
pub mod modules;
