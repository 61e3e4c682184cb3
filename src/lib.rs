//! aptly: Debian repository management
//!
//! The crate is organized around the execution [`context::Context`], which resolves
//! configuration and owns every shared resource a command needs: progress
//! reporting, downloads, the package database and its collections, the package
//! pool and the published tree. Optional diagnostics live in [`debug`].

pub mod cli;
pub mod collection;
pub mod config;
pub mod context;
pub mod database;
pub mod debug;
pub mod error;
pub mod files;
pub mod http;
pub mod logging;
pub mod options;
pub mod progress;
