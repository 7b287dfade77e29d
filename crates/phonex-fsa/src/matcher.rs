// Phone matchers: predicates over a single transcription element.
// Origin: plugins/PrefixDiacriticPhoneMatcher.java, plugins/SuffixDiacriticPhoneMatcher.java

use std::fmt;
use std::sync::Arc;

use phonex_core::character::{CharType, get_char_type};
use phonex_core::{ElementKind, FeatureError, FeatureMatrix, FeatureSet, PhoneticElement};

// ---------------------------------------------------------------------------
// FeatureSetMatcher
// ---------------------------------------------------------------------------

/// Matches elements by their resolved feature set.
///
/// An element matches when its features include every required feature and
/// none of the excluded ones.
#[derive(Debug, Clone)]
pub struct FeatureSetMatcher {
    matrix: Arc<FeatureMatrix>,
    required: FeatureSet,
    excluded: FeatureSet,
    /// Names as given, for diagnostics.
    names: Vec<String>,
}

impl FeatureSetMatcher {
    /// Build a matcher from feature names. A name prefixed with `-` is
    /// excluded rather than required.
    ///
    /// Every name is resolved now; an unknown name is an error.
    pub fn new(matrix: Arc<FeatureMatrix>, names: &[&str]) -> Result<Self, FeatureError> {
        let (excluded, required): (Vec<&str>, Vec<&str>) =
            names.iter().copied().partition(|n| n.starts_with('-'));
        let excluded: Vec<&str> = excluded
            .iter()
            .map(|n| n.trim_start_matches('-'))
            .collect();

        let required_set = matrix.feature_set_for_names(&required)?;
        let excluded_set = matrix.feature_set_for_names(&excluded)?;

        Ok(Self {
            matrix,
            required: required_set,
            excluded: excluded_set,
            names: names.iter().map(|n| n.to_string()).collect(),
        })
    }

    pub fn required(&self) -> &FeatureSet {
        &self.required
    }

    pub fn excluded(&self) -> &FeatureSet {
        &self.excluded
    }

    pub fn matches(&self, element: &PhoneticElement) -> bool {
        let features = self.matrix.element_features(element);
        features.is_superset(&self.required) && features.is_disjoint(&self.excluded)
    }
}

// ---------------------------------------------------------------------------
// PhoneMatcher
// ---------------------------------------------------------------------------

/// A predicate over one phonetic transcription element.
#[derive(Debug, Clone)]
pub enum PhoneMatcher {
    /// Matches every element.
    Any,
    /// Matches by feature set.
    Features(FeatureSetMatcher),
    /// Matches elements whose text equals the literal.
    Literal(String),
    /// Matches elements of the given structural kind.
    Kind(ElementKind),
    /// Inverts the inner matcher.
    Not(Box<PhoneMatcher>),
    /// All inner matchers must match.
    All(Vec<PhoneMatcher>),
    /// At least one inner matcher must match.
    AnyOf(Vec<PhoneMatcher>),
    /// Matches phones with a diacritic before the base character that the
    /// inner matcher accepts.
    PrefixDiacritic(Box<PhoneMatcher>),
    /// Matches phones with a diacritic after a base character that the
    /// inner matcher accepts. Both halves of a compound phone count.
    SuffixDiacritic(Box<PhoneMatcher>),
}

impl PhoneMatcher {
    /// Feature matcher over the given names; see [`FeatureSetMatcher::new`].
    pub fn features(matrix: Arc<FeatureMatrix>, names: &[&str]) -> Result<Self, FeatureError> {
        FeatureSetMatcher::new(matrix, names).map(PhoneMatcher::Features)
    }

    pub fn literal(text: impl Into<String>) -> Self {
        PhoneMatcher::Literal(text.into())
    }

    pub fn kind(kind: ElementKind) -> Self {
        PhoneMatcher::Kind(kind)
    }

    pub fn negate(self) -> Self {
        PhoneMatcher::Not(Box::new(self))
    }

    pub fn prefix_diacritic(inner: PhoneMatcher) -> Self {
        PhoneMatcher::PrefixDiacritic(Box::new(inner))
    }

    pub fn suffix_diacritic(inner: PhoneMatcher) -> Self {
        PhoneMatcher::SuffixDiacritic(Box::new(inner))
    }

    /// Test the element against this matcher.
    pub fn matches(&self, element: &PhoneticElement) -> bool {
        match self {
            PhoneMatcher::Any => true,
            PhoneMatcher::Features(fm) => fm.matches(element),
            PhoneMatcher::Literal(text) => element.text == *text,
            PhoneMatcher::Kind(kind) => element.kind == *kind,
            PhoneMatcher::Not(inner) => !inner.matches(element),
            PhoneMatcher::All(matchers) => matchers.iter().all(|m| m.matches(element)),
            PhoneMatcher::AnyOf(matchers) => matchers.iter().any(|m| m.matches(element)),
            PhoneMatcher::PrefixDiacritic(inner) => {
                diacritics(element, true).any(|d| inner.matches(&d))
            }
            PhoneMatcher::SuffixDiacritic(inner) => {
                diacritics(element, false).any(|d| inner.matches(&d))
            }
        }
    }

    /// Returns `true` if this matcher accepts every element regardless of
    /// content.
    pub fn matches_anything(&self) -> bool {
        match self {
            PhoneMatcher::Any => true,
            PhoneMatcher::All(matchers) => matchers.iter().all(PhoneMatcher::matches_anything),
            PhoneMatcher::AnyOf(matchers) => matchers.iter().any(PhoneMatcher::matches_anything),
            _ => false,
        }
    }
}

impl fmt::Display for PhoneMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneMatcher::Any => f.write_str("."),
            PhoneMatcher::Features(fm) => write!(f, "{{{}}}", fm.names.join(",")),
            PhoneMatcher::Literal(text) => write!(f, "'{text}'"),
            PhoneMatcher::Kind(kind) => write!(f, "<{}>", kind.label()),
            PhoneMatcher::Not(inner) => write!(f, "!{inner}"),
            PhoneMatcher::All(matchers) => write_joined(f, matchers, "&"),
            PhoneMatcher::AnyOf(matchers) => write_joined(f, matchers, "|"),
            PhoneMatcher::PrefixDiacritic(inner) => write!(f, "prefix({inner})"),
            PhoneMatcher::SuffixDiacritic(inner) => write!(f, "suffix({inner})"),
        }
    }
}

/// Diacritics of a phone, each as a standalone element: those before its
/// first base character when `prefix` is set, otherwise those after it.
fn diacritics(
    element: &PhoneticElement,
    prefix: bool,
) -> impl Iterator<Item = PhoneticElement> + '_ {
    let is_phone = element.is_phone();
    let mut seen_base = false;
    element
        .text
        .chars()
        .filter(move |&c| match get_char_type(c) {
            CharType::Base => {
                seen_base = true;
                false
            }
            CharType::Diacritic => is_phone && prefix != seen_base,
            _ => false,
        })
        .map(PhoneticElement::phone)
}

fn write_joined(f: &mut fmt::Formatter<'_>, matchers: &[PhoneMatcher], sep: &str) -> fmt::Result {
    f.write_str("[")?;
    for (i, m) in matchers.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{m}")?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> Arc<FeatureMatrix> {
        FeatureMatrix::shared().unwrap()
    }

    #[test]
    fn feature_matcher_requires_all_features() {
        let m = PhoneMatcher::features(matrix(), &["consonant", "voiced"]).unwrap();
        assert!(m.matches(&PhoneticElement::phone("b")));
        assert!(!m.matches(&PhoneticElement::phone("p")));
        assert!(!m.matches(&PhoneticElement::phone("a")));
    }

    #[test]
    fn feature_matcher_excluded_features() {
        let m = PhoneMatcher::features(matrix(), &["c", "-voiced"]).unwrap();
        assert!(m.matches(&PhoneticElement::phone("t")));
        assert!(!m.matches(&PhoneticElement::phone("d")));
    }

    #[test]
    fn feature_matcher_sees_diacritics() {
        let m = PhoneMatcher::features(matrix(), &["stop", "aspirated"]).unwrap();
        assert!(m.matches(&PhoneticElement::phone("tʰ")));
        assert!(!m.matches(&PhoneticElement::phone("t")));
    }

    #[test]
    fn boundaries_have_no_features() {
        let m = PhoneMatcher::features(matrix(), &["consonant"]).unwrap();
        assert!(!m.matches(&PhoneticElement::syllable_boundary()));
    }

    #[test]
    fn unknown_feature_fails_at_construction() {
        let err = PhoneMatcher::features(matrix(), &["consonant", "-sparkly"]).unwrap_err();
        assert!(matches!(err, FeatureError::UnknownFeature(name) if name == "sparkly"));
    }

    #[test]
    fn literal_kind_and_combinators() {
        let t = PhoneMatcher::literal("t");
        assert!(t.matches(&PhoneticElement::phone("t")));
        assert!(!t.matches(&PhoneticElement::phone("tʰ")));

        let stress = PhoneMatcher::kind(ElementKind::Stress);
        assert!(stress.matches(&PhoneticElement::stress("ˈ")));

        let not_t = PhoneMatcher::literal("t").negate();
        assert!(not_t.matches(&PhoneticElement::phone("d")));

        let both = PhoneMatcher::All(vec![PhoneMatcher::kind(ElementKind::Phone), not_t]);
        assert!(both.matches(&PhoneticElement::phone("d")));
        assert!(!both.matches(&PhoneticElement::word_boundary()));

        let either =
            PhoneMatcher::AnyOf(vec![PhoneMatcher::literal("a"), PhoneMatcher::literal("e")]);
        assert!(either.matches(&PhoneticElement::phone("e")));
        assert!(!either.matches(&PhoneticElement::phone("i")));
    }

    #[test]
    fn diacritic_matchers() {
        let aspirated = PhoneMatcher::suffix_diacritic(PhoneMatcher::literal("ʰ"));
        assert!(aspirated.matches(&PhoneticElement::phone("tʰ")));
        assert!(aspirated.matches(&PhoneticElement::phone("t͡sʰ")));
        assert!(!aspirated.matches(&PhoneticElement::phone("t")));
        assert!(!aspirated.matches(&PhoneticElement::phone("tʷ")));

        let prenasal = PhoneMatcher::prefix_diacritic(PhoneMatcher::literal("ⁿ"));
        assert!(prenasal.matches(&PhoneticElement::phone("ⁿd")));
        assert!(!prenasal.matches(&PhoneticElement::phone("dⁿ")));
        let suffix_n = PhoneMatcher::suffix_diacritic(PhoneMatcher::literal("ⁿ"));
        assert!(!suffix_n.matches(&PhoneticElement::phone("ⁿd")));

        let any_suffix = PhoneMatcher::suffix_diacritic(PhoneMatcher::Any);
        assert!(any_suffix.matches(&PhoneticElement::phone("aː")));
        assert!(!any_suffix.matches(&PhoneticElement::stress("ˈ")));
        assert_eq!(aspirated.to_string(), "suffix('ʰ')");
        assert_eq!(prenasal.to_string(), "prefix('ⁿ')");
    }

    #[test]
    fn matches_anything() {
        assert!(PhoneMatcher::Any.matches_anything());
        let with_any = PhoneMatcher::AnyOf(vec![PhoneMatcher::literal("a"), PhoneMatcher::Any]);
        assert!(with_any.matches_anything());
        assert!(!PhoneMatcher::literal("a").matches_anything());
    }

    #[test]
    fn display() {
        let m = PhoneMatcher::features(matrix(), &["c", "-voiced"]).unwrap();
        assert_eq!(m.to_string(), "{c,-voiced}");
        assert_eq!(PhoneMatcher::kind(ElementKind::Pause).to_string(), "<pause>");
        assert_eq!(PhoneMatcher::literal("a").negate().to_string(), "!'a'");
    }
}
