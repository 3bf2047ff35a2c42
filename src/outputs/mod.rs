//! Output generation: terminal cards and JSON export.
//!
//! # Submodules
//!
//! - [`cards`]: Renders the filtered article view, navigation bar and source list as text
//! - [`json`]: Writes the filtered article view to a JSON file

pub mod cards;
pub mod json;
