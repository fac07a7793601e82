//! Survey CLI - command line front end for the survey geometry engine.
//!
//! The `survey` binary keeps a survey layer in a JSON project file and drives
//! the engine one subcommand at a time:
//! - init / params: create a project and edit flight parameters
//! - select / deselect / elevation: edit the cell selection
//! - summary / export / preview: read derived values, GeoJSON and SVG

pub mod commands;
pub mod config;
pub mod project;
pub mod svg;

pub use config::Config;
pub use project::OpenProject;
