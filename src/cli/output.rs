//! CLI output: error mapping from domain errors to the printed message.

use crate::error::AptlyError;

/// Render an error the way it is printed before the process exits.
pub fn map_error(e: &AptlyError) -> String {
    format!("ERROR: {}", e)
}
