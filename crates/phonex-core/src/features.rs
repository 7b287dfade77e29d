// Phonetic feature model: feature definitions, per-character feature sets,
// and name/synonym lookup.
// Origin: features/FeatureMatrix.java

use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use serde::Deserialize;

use crate::FeatureError;
use crate::element::PhoneticElement;

// ---------------------------------------------------------------------------
// FeatureSet
// ---------------------------------------------------------------------------

/// A set of features, stored as a bit set over feature indices.
///
/// Trailing zero words are always trimmed so that derived equality compares
/// set contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FeatureSet {
    words: Vec<u64>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from feature indices.
    pub fn from_indices(indices: impl IntoIterator<Item = u16>) -> Self {
        let mut set = Self::new();
        for idx in indices {
            set.insert(idx);
        }
        set
    }

    pub fn insert(&mut self, idx: u16) {
        let (word, bit) = (idx as usize / 64, idx as usize % 64);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << bit;
    }

    pub fn contains(&self, idx: u16) -> bool {
        let (word, bit) = (idx as usize / 64, idx as usize % 64);
        self.words.get(word).is_some_and(|&w| w & (1u64 << bit) != 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Set union.
    pub fn union(&self, other: &FeatureSet) -> FeatureSet {
        let len = self.words.len().max(other.words.len());
        let words = (0..len)
            .map(|i| self.word(i) | other.word(i))
            .collect();
        FeatureSet { words }
    }

    /// Set intersection.
    pub fn intersection(&self, other: &FeatureSet) -> FeatureSet {
        let len = self.words.len().min(other.words.len());
        let mut set = FeatureSet {
            words: (0..len).map(|i| self.word(i) & other.word(i)).collect(),
        };
        set.trim();
        set
    }

    /// Returns `true` if every feature of `other` is in `self`.
    pub fn is_superset(&self, other: &FeatureSet) -> bool {
        other
            .words
            .iter()
            .enumerate()
            .all(|(i, &w)| self.word(i) & w == w)
    }

    /// Returns `true` if the two sets share no feature.
    pub fn is_disjoint(&self, other: &FeatureSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    /// Iterate over the feature indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &w)| {
            (0..64u16)
                .filter(move |&bit| w & (1u64 << bit) != 0)
                .map(move |bit| i as u16 * 64 + bit)
        })
    }

    #[inline]
    fn word(&self, i: usize) -> u64 {
        self.words.get(i).copied().unwrap_or(0)
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// Feature definitions
// ---------------------------------------------------------------------------

/// A single phonetic feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Index of this feature in the owning [`FeatureMatrix`].
    pub index: u16,
    /// Canonical feature name.
    pub name: String,
    /// Alternative names accepted by lookup.
    pub synonyms: Vec<String>,
    /// Primary feature family (e.g. `place`, `manner`).
    pub primary_family: Option<String>,
    /// Secondary feature family.
    pub secondary_family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureTable {
    features: Vec<FeatureDef>,
    characters: std::collections::BTreeMap<String, Vec<String>>,
    #[serde(default)]
    named_sets: std::collections::BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct FeatureDef {
    name: String,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    primary_family: Option<String>,
    #[serde(default)]
    secondary_family: Option<String>,
}

const BUILTIN_TABLE: &str = include_str!("../data/features.json");

static SHARED: OnceLock<Arc<FeatureMatrix>> = OnceLock::new();

// ---------------------------------------------------------------------------
// FeatureMatrix
// ---------------------------------------------------------------------------

/// Feature table: maps characters to feature sets and feature names (or
/// synonyms) to feature definitions.
///
/// A matrix is loaded once and then only read. Phone matchers hold it through
/// an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrix {
    features: Vec<Feature>,
    /// Lowercased name or synonym to feature index.
    name_index: HashMap<String, u16>,
    char_features: HashMap<char, FeatureSet>,
    named_sets: HashMap<String, FeatureSet>,
}

impl FeatureMatrix {
    /// Load a feature table from its JSON representation.
    ///
    /// ```json
    /// {
    ///   "features": [{ "name": "consonant", "synonyms": ["c"], "primary_family": "major" }],
    ///   "characters": { "p": ["consonant"] },
    ///   "named_sets": { "obstruent": ["consonant"] }
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, FeatureError> {
        let table: FeatureTable = serde_json::from_str(json)?;
        let count = table.features.len();
        if count > usize::from(u16::MAX) + 1 {
            return Err(FeatureError::TooManyFeatures(count));
        }
        let mut matrix = FeatureMatrix::default();

        for (index, def) in (0..=u16::MAX).zip(table.features) {
            for name in std::iter::once(&def.name).chain(def.synonyms.iter()) {
                let key = name.to_lowercase();
                if matrix.name_index.insert(key, index).is_some() {
                    return Err(FeatureError::DuplicateFeature(name.clone()));
                }
            }
            matrix.features.push(Feature {
                index,
                name: def.name,
                synonyms: def.synonyms,
                primary_family: def.primary_family,
                secondary_family: def.secondary_family,
            });
        }

        for (chars, names) in &table.characters {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let set = matrix.feature_set_for_names(&names)?;
            for c in chars.chars() {
                matrix.char_features.insert(c, set.clone());
            }
        }

        for (name, names) in &table.named_sets {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let set = matrix.feature_set_for_names(&names)?;
            matrix.named_sets.insert(name.to_lowercase(), set);
        }

        Ok(matrix)
    }

    /// The small feature table bundled with this crate.
    pub fn builtin() -> Result<Self, FeatureError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Process-wide instance of the built-in table, loaded on first use.
    pub fn shared() -> Result<Arc<FeatureMatrix>, FeatureError> {
        if let Some(matrix) = SHARED.get() {
            return Ok(matrix.clone());
        }
        let matrix = Arc::new(Self::builtin()?);
        Ok(SHARED.get_or_init(|| matrix).clone())
    }

    pub fn number_of_features(&self) -> usize {
        self.features.len()
    }

    /// All features in index order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Look up a feature by name or synonym (case-insensitive).
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.name_index
            .get(&name.to_lowercase())
            .map(|&idx| &self.features[idx as usize])
    }

    /// Feature set of a single character. Unknown characters have no features.
    pub fn feature_set(&self, c: char) -> FeatureSet {
        self.char_features.get(&c).cloned().unwrap_or_default()
    }

    /// Feature set of a transcription element: the union over every
    /// character of its text (base, diacritics and compound parts).
    pub fn element_features(&self, element: &PhoneticElement) -> FeatureSet {
        element
            .text
            .chars()
            .filter_map(|c| self.char_features.get(&c))
            .fold(FeatureSet::new(), |acc, set| acc.union(set))
    }

    /// Union of the named features (names, synonyms or named sets).
    pub fn feature_set_for_names(&self, names: &[&str]) -> Result<FeatureSet, FeatureError> {
        let mut set = FeatureSet::new();
        for name in names {
            let key = name.to_lowercase();
            if let Some(&idx) = self.name_index.get(&key) {
                set.insert(idx);
            } else if let Some(named) = self.named_sets.get(&key) {
                set = set.union(named);
            } else {
                return Err(FeatureError::UnknownFeature(name.to_string()));
            }
        }
        Ok(set)
    }

    /// Named feature set by name.
    pub fn named_feature_set(&self, name: &str) -> Option<&FeatureSet> {
        self.named_sets.get(&name.to_lowercase())
    }

    /// Names of features whose primary family is `family`.
    pub fn features_with_primary_family(&self, family: &str) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.primary_family.as_deref() == Some(family))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Characters carrying the given feature, sorted.
    pub fn characters_with_feature(&self, name: &str) -> Vec<char> {
        let Some(feature) = self.feature(name) else {
            return Vec::new();
        };
        let mut chars: Vec<char> = self
            .char_features
            .iter()
            .filter(|(_, set)| set.contains(feature.index))
            .map(|(&c, _)| c)
            .collect();
        chars.sort_unstable();
        chars
    }
}
