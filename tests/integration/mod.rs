//! Integration tests for the aptly execution context and command line

mod cli_route;
mod config_resolution;
mod context_lifecycle;
pub mod test_utils;
