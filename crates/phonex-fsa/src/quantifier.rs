// Quantifiers: repetition of a matcher, backreference or whole automaton.
// Origin: PhonexFSA.java:313-552 (quantified appends, makeBounded)

use std::fmt;

use crate::FsaError;
use crate::transition::TransitionKind;

/// Shape of a quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierType {
    /// `*`
    ZeroOrMore,
    /// `?`
    ZeroOrOne,
    /// `+`
    OneOrMore,
    /// `<min,max>`; `max == None` is open-ended.
    Bounded { min: usize, max: Option<usize> },
}

/// A repetition specification plus its greedy/lazy/possessive disposition.
///
/// Immutable once built. Bounded quantifiers are validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    qtype: QuantifierType,
    kind: TransitionKind,
}

impl Quantifier {
    pub fn zero_or_more() -> Self {
        Self::new(QuantifierType::ZeroOrMore)
    }

    pub fn zero_or_one() -> Self {
        Self::new(QuantifierType::ZeroOrOne)
    }

    pub fn one_or_more() -> Self {
        Self::new(QuantifierType::OneOrMore)
    }

    /// `<min,max>`. Fails when `min > max`.
    pub fn bounded(min: usize, max: Option<usize>) -> Result<Self, FsaError> {
        if let Some(max) = max {
            if min > max {
                return Err(FsaError::InvalidQuantifierBounds { min, max });
            }
        }
        Ok(Self::new(QuantifierType::Bounded { min, max }))
    }

    /// `<n>`: exactly `n` repetitions.
    pub fn exactly(n: usize) -> Self {
        Self::new(QuantifierType::Bounded {
            min: n,
            max: Some(n),
        })
    }

    fn new(qtype: QuantifierType) -> Self {
        Self {
            qtype,
            kind: TransitionKind::Greedy,
        }
    }

    /// Same quantifier with a lazy disposition (`*?`, `+?`, ...).
    pub fn lazy(self) -> Self {
        Self {
            kind: TransitionKind::Lazy,
            ..self
        }
    }

    /// Same quantifier with a possessive disposition (`*+`, `++`, ...).
    pub fn possessive(self) -> Self {
        Self {
            kind: TransitionKind::Possessive,
            ..self
        }
    }

    pub fn qtype(&self) -> QuantifierType {
        self.qtype
    }

    /// The transition kind written onto quantified transitions.
    pub fn transition_kind(&self) -> TransitionKind {
        self.kind
    }

    /// Returns `true` if `count` repetitions satisfy this quantifier.
    pub fn accepts_count(&self, count: usize) -> bool {
        match self.qtype {
            QuantifierType::ZeroOrMore => true,
            QuantifierType::ZeroOrOne => count <= 1,
            QuantifierType::OneOrMore => count >= 1,
            QuantifierType::Bounded { min, max } => count >= min && max.is_none_or(|m| count <= m),
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qtype {
            QuantifierType::ZeroOrMore => f.write_str("*")?,
            QuantifierType::ZeroOrOne => f.write_str("?")?,
            QuantifierType::OneOrMore => f.write_str("+")?,
            QuantifierType::Bounded { min, max: Some(max) } if min == max => write!(f, "<{min}>")?,
            QuantifierType::Bounded { min, max: Some(max) } => write!(f, "<{min},{max}>")?,
            QuantifierType::Bounded { min, max: None } => write!(f, "<{min},>")?,
        }
        match self.kind {
            TransitionKind::Greedy => Ok(()),
            TransitionKind::Lazy => f.write_str("?"),
            TransitionKind::Possessive => f.write_str("+"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_rejects_min_above_max() {
        let err = Quantifier::bounded(3, Some(2)).unwrap_err();
        assert!(matches!(err, FsaError::InvalidQuantifierBounds { min: 3, max: 2 }));
        assert!(Quantifier::bounded(2, Some(2)).is_ok());
        assert!(Quantifier::bounded(5, None).is_ok());
    }

    #[test]
    fn disposition() {
        assert_eq!(Quantifier::zero_or_more().transition_kind(), TransitionKind::Greedy);
        assert_eq!(Quantifier::zero_or_more().lazy().transition_kind(), TransitionKind::Lazy);
        assert_eq!(
            Quantifier::one_or_more().possessive().transition_kind(),
            TransitionKind::Possessive
        );
    }

    #[test]
    fn accepts_count() {
        let q = Quantifier::bounded(1, Some(3)).unwrap();
        assert!(!q.accepts_count(0));
        assert!(q.accepts_count(3));
        assert!(!q.accepts_count(4));
        assert!(Quantifier::bounded(2, None).unwrap().accepts_count(50));
        assert!(Quantifier::zero_or_one().accepts_count(0));
        assert!(!Quantifier::zero_or_one().accepts_count(2));
    }

    #[test]
    fn display() {
        assert_eq!(Quantifier::zero_or_more().lazy().to_string(), "*?");
        assert_eq!(Quantifier::exactly(2).to_string(), "<2>");
        assert_eq!(Quantifier::bounded(1, None).unwrap().possessive().to_string(), "<1,>+");
        assert_eq!(Quantifier::bounded(0, Some(4)).unwrap().to_string(), "<0,4>");
    }
}
