// List syllable onsets in an IPA transcription: ({c}+){v}
//
//   cargo run -p phonex-fsa --example onsets -- "ˈstrɛŋkθs ə.ˈbaʊt"

use phonex_core::{FeatureMatrix, transcript};
use phonex_fsa::{PhoneMatcher, PhonexFsa, Quantifier};

fn main() {
    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ˈsplæʃ.ɪŋ ɪn.tʊ ðə ˈstriːm".to_string());

    let matrix = FeatureMatrix::shared().expect("builtin feature table");
    let consonant = PhoneMatcher::features(matrix.clone(), &["consonant"]).expect("consonant");
    let vowel = PhoneMatcher::features(matrix, &["vowel"]).expect("vowel");

    let mut onset = PhonexFsa::new();
    onset.append_matcher_with_quantifier(consonant, Quantifier::one_or_more(), &[]);
    onset.set_group_index(1);

    let mut fsa = PhonexFsa::new();
    fsa.append_group(&onset);
    fsa.append_matcher(vowel, &[]);
    fsa.set_group_count(1);
    fsa.set_group_name(1, "onset").expect("group 1 exists");
    println!("{fsa}");

    let pattern = fsa.freeze().expect("valid automaton");
    let input = transcript::parse(&text);
    println!("{} elements in {text:?}", input.len());

    for m in pattern.match_all(&input) {
        let whole = m.elements(&input, 0).map(transcript::to_text).unwrap_or_default();
        let onset = m
            .named_group("onset")
            .and_then(|r| input.get(r))
            .map(transcript::to_text)
            .unwrap_or_default();
        println!("{:>3}..{:<3} {whole:8} onset {onset}", m.start(), m.end());
    }
}
