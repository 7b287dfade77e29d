// Transcript tokenizer: IPA text to a sequence of phonetic elements.
// Origin: IPATranscript.java:58-92 (parseIPATranscript)

use crate::character::{CharType, SYLLABLE_BOUNDARY, get_char_type};
use crate::element::{ElementKind, PhoneticElement};

/// Split an IPA transcription into phonetic elements.
///
/// - `ˈ` and `ˌ` become stress elements,
/// - `.` becomes a syllable boundary,
/// - runs of whitespace become a single word boundary,
/// - `(.)`, `(..)` and `(...)` become pauses,
/// - combining diacritics and length/modifier letters attach to the
///   preceding phone,
/// - a tie bar joins the preceding phone and the next base character into
///   one compound phone.
///
/// Every other character starts a new phone. The tokenizer never fails.
pub fn parse(text: &str) -> Vec<PhoneticElement> {
    let chars: Vec<char> = text.chars().collect();
    let mut elements: Vec<PhoneticElement> = Vec::new();
    let mut join_next = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '(' {
            if let Some(len) = pause_length(&chars[i..]) {
                elements.push(PhoneticElement::pause(chars[i..i + len].iter().collect::<String>()));
                join_next = false;
                i += len;
                continue;
            }
        }

        match get_char_type(c) {
            CharType::Stress => {
                elements.push(PhoneticElement::stress(c));
                join_next = false;
            }
            CharType::SyllableBoundary => {
                elements.push(PhoneticElement::syllable_boundary());
                join_next = false;
            }
            CharType::Whitespace => {
                if !matches!(elements.last(), Some(e) if e.kind == ElementKind::WordBoundary) {
                    elements.push(PhoneticElement::word_boundary());
                }
                join_next = false;
            }
            CharType::Diacritic => match last_phone(&mut elements) {
                Some(phone) => phone.text.push(c),
                None => elements.push(PhoneticElement::phone(c)),
            },
            CharType::TieBar => match last_phone(&mut elements) {
                Some(phone) => {
                    phone.text.push(c);
                    join_next = true;
                }
                None => elements.push(PhoneticElement::phone(c)),
            },
            CharType::Base => {
                if join_next {
                    if let Some(phone) = last_phone(&mut elements) {
                        phone.text.push(c);
                        join_next = false;
                        i += 1;
                        continue;
                    }
                }
                elements.push(PhoneticElement::phone(c));
            }
        }
        i += 1;
    }

    elements
}

/// Render elements back to transcript text.
pub fn to_text(elements: &[PhoneticElement]) -> String {
    elements.iter().map(|e| e.text.as_str()).collect()
}

/// Length in characters of a pause starting at `chars[0] == '('`.
fn pause_length(chars: &[char]) -> Option<usize> {
    let dots = chars[1..].iter().take_while(|&&c| c == SYLLABLE_BOUNDARY).count();
    if (1..=3).contains(&dots) && chars.get(dots + 1) == Some(&')') {
        Some(dots + 2)
    } else {
        None
    }
}

fn last_phone(elements: &mut [PhoneticElement]) -> Option<&mut PhoneticElement> {
    elements.last_mut().filter(|e| e.kind == ElementKind::Phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(elements: &[PhoneticElement]) -> Vec<&str> {
        elements.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn plain_phones() {
        let elements = parse("kat");
        assert_eq!(texts(&elements), vec!["k", "a", "t"]);
        assert!(elements.iter().all(|e| e.kind == ElementKind::Phone));
    }

    #[test]
    fn stress_and_syllable_boundaries() {
        let elements = parse("ˈba.na");
        let kinds: Vec<ElementKind> = elements.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Stress,
                ElementKind::Phone,
                ElementKind::Phone,
                ElementKind::SyllableBoundary,
                ElementKind::Phone,
                ElementKind::Phone,
            ]
        );
    }

    #[test]
    fn whitespace_collapses_to_one_word_boundary() {
        let elements = parse("a  b");
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1].kind, ElementKind::WordBoundary);
    }

    #[test]
    fn diacritics_attach_to_previous_phone() {
        let elements = parse("tʰaː");
        assert_eq!(texts(&elements), vec!["tʰ", "aː"]);
    }

    #[test]
    fn tie_bar_builds_compound_phone() {
        let elements = parse("t\u{0361}ʃa");
        assert_eq!(texts(&elements), vec!["t\u{0361}ʃ", "a"]);
    }

    #[test]
    fn pauses() {
        let elements = parse("a (..) b");
        assert_eq!(elements[2].kind, ElementKind::Pause);
        assert_eq!(elements[2].text, "(..)");
        // An unterminated pause is just a phone followed by a boundary.
        let elements = parse("(.");
        assert_eq!(elements[0].kind, ElementKind::Phone);
        assert_eq!(elements[1].kind, ElementKind::SyllableBoundary);
    }

    #[test]
    fn round_trip_text() {
        let text = "ˈtʰa.ma";
        assert_eq!(to_text(&parse(text)), text);
    }
}
