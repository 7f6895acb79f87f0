//! Command implementations for apisig CLI
//!
//! Each command module provides an argument struct and a `run` function.

pub mod check;
pub mod diff;
pub mod format;
pub mod issues;
