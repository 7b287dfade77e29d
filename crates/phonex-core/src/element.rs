// Phonetic transcription elements: the alphabet phonex automata run over.
// Origin: IPATranscript.java (elementAt, subsection), Phone.java

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ElementKind
// ---------------------------------------------------------------------------

/// Structural kind of a transcription element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// A segment: basic or compound phone, with any attached diacritics.
    Phone,
    /// Primary (`ˈ`) or secondary (`ˌ`) stress marker.
    Stress,
    /// Syllable boundary (`.`).
    SyllableBoundary,
    /// Word boundary (whitespace in the source transcript).
    WordBoundary,
    /// Pause: `(.)`, `(..)` or `(...)`.
    Pause,
}

impl ElementKind {
    /// Short lowercase label, used in diagnostics output.
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Phone => "phone",
            ElementKind::Stress => "stress",
            ElementKind::SyllableBoundary => "syllable_boundary",
            ElementKind::WordBoundary => "word_boundary",
            ElementKind::Pause => "pause",
        }
    }
}

// ---------------------------------------------------------------------------
// PhoneticElement
// ---------------------------------------------------------------------------

/// One element of a phonetic transcription.
///
/// Equality is element-level: two elements are equal when both their kind and
/// their full text (base character plus diacritics) are equal. Backreferences
/// compare captured runs with this equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneticElement {
    /// The structural kind of this element.
    pub kind: ElementKind,
    /// The transcription text of this element.
    pub text: String,
}

impl PhoneticElement {
    /// Create a new element.
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn phone(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Phone, text)
    }

    pub fn stress(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Stress, text)
    }

    pub fn syllable_boundary() -> Self {
        Self::new(ElementKind::SyllableBoundary, ".")
    }

    pub fn word_boundary() -> Self {
        Self::new(ElementKind::WordBoundary, " ")
    }

    pub fn pause(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Pause, text)
    }

    /// The base (first) character of the element text, if any.
    pub fn base(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// Returns `true` if this element is a phone.
    #[inline]
    pub fn is_phone(&self) -> bool {
        self.kind == ElementKind::Phone
    }
}

impl std::fmt::Display for PhoneticElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
