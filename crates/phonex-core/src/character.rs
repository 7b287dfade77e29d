// IPA character classification used by the transcript tokenizer.
// Origin: IPATranscript.java (parseIPATranscript, character classes)

// ---------------------------------------------------------------------------
// Character constants
// ---------------------------------------------------------------------------

/// Primary stress marker.
pub const PRIMARY_STRESS: char = '\u{02C8}';

/// Secondary stress marker.
pub const SECONDARY_STRESS: char = '\u{02CC}';

/// Syllable boundary marker.
pub const SYLLABLE_BOUNDARY: char = '.';

/// Combining double inverted breve (tie bar above).
pub const TIE_BAR_ABOVE: char = '\u{0361}';

/// Combining double breve below (tie bar below).
pub const TIE_BAR_BELOW: char = '\u{035C}';

/// Length and modifier letters that attach to the preceding phone.
const SUFFIX_MODIFIERS: &[char] = &[
    '\u{02D0}', // ː LENGTH MARK
    '\u{02D1}', // ˑ HALF-LENGTH MARK
    '\u{02B0}', // ʰ MODIFIER LETTER SMALL H
    '\u{02B1}', // ʱ MODIFIER LETTER SMALL H WITH HOOK
    '\u{02B2}', // ʲ MODIFIER LETTER SMALL J
    '\u{02B7}', // ʷ MODIFIER LETTER SMALL W
    '\u{02E0}', // ˠ MODIFIER LETTER SMALL GAMMA
    '\u{02E4}', // ˤ MODIFIER LETTER SMALL REVERSED GLOTTAL STOP
    '\u{207F}', // ⁿ SUPERSCRIPT LATIN SMALL LETTER N
    '\u{02E1}', // ˡ MODIFIER LETTER SMALL L
    '\u{02BC}', // ʼ MODIFIER LETTER APOSTROPHE (ejective)
];

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// Tokenizer-level classification of a single transcript character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharType {
    /// A base character that starts a new phone.
    Base,
    /// Primary or secondary stress marker.
    Stress,
    /// The syllable boundary `.`.
    SyllableBoundary,
    /// Whitespace (word boundary).
    Whitespace,
    /// Combining diacritic or modifier letter attached to the previous phone.
    Diacritic,
    /// A tie bar joining the previous and next characters into one phone.
    TieBar,
}

/// Returns the tokenizer classification for a character.
pub fn get_char_type(c: char) -> CharType {
    if c == PRIMARY_STRESS || c == SECONDARY_STRESS {
        return CharType::Stress;
    }
    if c == SYLLABLE_BOUNDARY {
        return CharType::SyllableBoundary;
    }
    if c.is_whitespace() {
        return CharType::Whitespace;
    }
    if c == TIE_BAR_ABOVE || c == TIE_BAR_BELOW {
        return CharType::TieBar;
    }
    if is_combining_diacritic(c) || SUFFIX_MODIFIERS.contains(&c) {
        return CharType::Diacritic;
    }
    CharType::Base
}

/// Check whether a character is a combining diacritical mark.
///
/// Covers the Combining Diacritical Marks block (U+0300..U+036F) and its
/// supplement (U+1DC0..U+1DFF), minus the two tie bars.
pub fn is_combining_diacritic(c: char) -> bool {
    let cp = c as u32;
    ((0x0300..=0x036F).contains(&cp) || (0x1DC0..=0x1DFF).contains(&cp))
        && c != TIE_BAR_ABOVE
        && c != TIE_BAR_BELOW
}
