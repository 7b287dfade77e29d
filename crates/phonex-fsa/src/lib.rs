//! Phonex automaton engine.
//!
//! This crate builds and runs the nondeterministic finite state automata that
//! phonex patterns compile to. Patterns match sequences of phonetic
//! transcription elements (see [`phonex_core`]) rather than characters.
//!
//! # Architecture
//!
//! - [`matcher`] -- Predicates over a single element (features, literals, kinds)
//! - [`quantifier`] -- Repetition specifications with greedy/lazy/possessive kind
//! - [`transition`] -- State ids, guards and transitions
//! - [`automaton`] -- The mutable automaton and its construction API
//! - [`frozen`] -- Validated, read-only automata with a precomputed search order
//! - [`config`] -- Execution configuration and the backtracking search stack
//! - [`exec`] -- Anchored, scanning and iterating matchers
//! - [`result`] -- Match results and capture groups
//!
//! # Example
//!
//! ```
//! use phonex_core::transcript;
//! use phonex_fsa::{PhoneMatcher, PhonexFsa, Quantifier};
//! use phonex_core::FeatureMatrix;
//!
//! let matrix = FeatureMatrix::shared().unwrap();
//! let consonant = PhoneMatcher::features(matrix.clone(), &["consonant"]).unwrap();
//! let vowel = PhoneMatcher::features(matrix, &["vowel"]).unwrap();
//!
//! // {c}+{v}
//! let mut fsa = PhonexFsa::new();
//! fsa.append_matcher_with_quantifier(consonant, Quantifier::one_or_more(), &[]);
//! fsa.append_matcher(vowel, &[]);
//! let pattern = fsa.freeze().unwrap();
//!
//! let input = transcript::parse("stra");
//! let m = pattern.find_first(&input).unwrap();
//! assert_eq!(m.range(), 0..4);
//! ```

pub mod automaton;
pub mod config;
pub mod exec;
pub mod frozen;
pub mod matcher;
pub mod quantifier;
pub mod result;
pub mod transition;

pub use automaton::PhonexFsa;
pub use config::ExecConfig;
pub use exec::{Executor, Matches};
pub use frozen::FrozenFsa;
pub use matcher::{FeatureSetMatcher, PhoneMatcher};
pub use quantifier::{Quantifier, QuantifierType};
pub use result::PhonexMatch;
pub use transition::{Guard, MatchOffset, StateId, Transition, TransitionKind};

use phonex_core::FeatureError;

/// Error type for automaton construction and execution.
#[derive(Debug, thiserror::Error)]
pub enum FsaError {
    #[error("invalid quantifier bounds: min {min} is greater than max {max}")]
    InvalidQuantifierBounds { min: usize, max: usize },
    #[error("group index {index} out of range (automaton has {group_count} groups)")]
    GroupIndexOutOfRange { index: usize, group_count: usize },
    #[error("duplicate group name: {0}")]
    DuplicateGroupName(String),
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

/// Suggested search step budget for untrusted patterns or input; see
/// [`ExecConfig::bounded`].
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;
