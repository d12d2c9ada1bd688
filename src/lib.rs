//! l10n-workbench
//!
//! Translation workbench for Paradox mod localisation files: classifies source
//! keys against a target language, stores translations and builds translated
//! localisation files.

pub mod classify;
pub mod config;
pub mod db;
pub mod indexer;
pub mod input;
pub mod server;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_utils;
