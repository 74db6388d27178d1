//! Command implementations
//!
//! Each module corresponds to an operation exposed by the CLI.

pub mod send;

pub use send::run as send_run;
