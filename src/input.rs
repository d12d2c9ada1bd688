//! Salsa inputs: the source key catalog and per-language translation sets.

pub mod source;
pub mod translation;
