//! checksumit command line front end
//!
//! Expands paths, loads layered configuration, drives the core batch
//! processor and renders its results and progress.

pub mod config;
pub mod file_discovery;
pub mod output;
pub mod progress;
pub mod terminal;
