//! Core batch processing logic

pub mod classify;
pub mod importer;
pub mod runner;
pub mod status;
