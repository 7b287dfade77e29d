//! Shared types for the phonex pattern engine.
//!
//! This crate holds the pieces the automaton engine consults but does not own:
//!
//! - [`element`] -- Phonetic transcription elements (the automaton alphabet)
//! - [`character`] -- IPA character classification
//! - [`transcript`] -- Tokenizing IPA text into elements
//! - [`features`] -- The phonetic feature model (feature sets, name lookup)

pub mod character;
pub mod element;
pub mod features;
pub mod transcript;

pub use element::{ElementKind, PhoneticElement};
pub use features::{Feature, FeatureMatrix, FeatureSet};

/// Error type for feature table loading and feature name resolution.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
    #[error("duplicate feature name or synonym: {0}")]
    DuplicateFeature(String),
    #[error("feature table has {0} features; at most 65536 are supported")]
    TooManyFeatures(usize),
    #[error("invalid feature table: {0}")]
    InvalidTable(#[from] serde_json::Error),
}
