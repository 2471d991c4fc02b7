//! Infrastructure layer (adapters/implementations).
//!
//! Contracts for the collaborators the preview engine consumes, with
//! default adapters for the filesystem, stderr and the TOML config file.

pub mod app_config;
pub mod dialog;
pub mod opener;
pub mod operations;
pub mod preferences;
pub mod preview_uri;
pub mod probe;
