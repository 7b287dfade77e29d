// Automaton states and transitions.
// Origin: FSATransition.java (init and matcher groups, OffsetType)

use std::collections::BTreeSet;
use std::fmt;

use phonex_core::PhoneticElement;

use crate::matcher::PhoneMatcher;

/// Identifier of a state inside one automaton's state arena.
///
/// Ids are only meaningful to the automaton that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Search-order bias of a transition.
///
/// Kind never changes which inputs an automaton accepts, only which
/// accepting path the execution engine reports first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionKind {
    /// Prefer consuming more input.
    #[default]
    Greedy,
    /// Prefer stopping early.
    Lazy,
    /// Like greedy, but the engine never backtracks into the transition.
    Possessive,
}

/// Where the elements a transition consumes are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchOffset {
    /// Part of the match.
    #[default]
    Match,
    /// Context before the match; consumed but not reported.
    LookBehind,
    /// Context after the match; consumed but not reported.
    LookAhead,
}

/// What must hold for a transition to be taken.
#[derive(Debug, Clone)]
pub enum Guard {
    /// Consume one element matching the primary and every secondary matcher.
    Matcher {
        primary: PhoneMatcher,
        secondary: Vec<PhoneMatcher>,
    },
    /// Consume a run equal to the current capture of `group`; every element
    /// of the run must also satisfy the secondary matchers.
    BackReference {
        group: usize,
        secondary: Vec<PhoneMatcher>,
    },
    /// Consume nothing.
    Epsilon,
}

impl Guard {
    /// Test a single element against a matcher guard.
    ///
    /// Backreference and epsilon guards are resolved by the execution engine
    /// and always return `false` here.
    pub fn matches_element(&self, element: &PhoneticElement) -> bool {
        match self {
            Guard::Matcher { primary, secondary } => {
                primary.matches(element) && secondary.iter().all(|m| m.matches(element))
            }
            Guard::BackReference { .. } | Guard::Epsilon => false,
        }
    }

    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Guard::Epsilon)
    }
}

/// A labelled edge between two states of the same automaton.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub guard: Guard,
    /// Groups this transition starts capturing.
    pub init_groups: BTreeSet<usize>,
    /// Groups this transition extends.
    pub continuation_groups: BTreeSet<usize>,
    pub kind: TransitionKind,
    pub offset: MatchOffset,
}

impl Transition {
    pub fn new(from: StateId, to: StateId, guard: Guard) -> Self {
        Self {
            from,
            to,
            guard,
            init_groups: BTreeSet::new(),
            continuation_groups: BTreeSet::new(),
            kind: TransitionKind::Greedy,
            offset: MatchOffset::Match,
        }
    }

    /// Copy of this transition rewired between two other states.
    pub(crate) fn rewired(&self, from: StateId, to: StateId) -> Self {
        Self {
            from,
            to,
            ..self.clone()
        }
    }

    /// Every group index this transition touches.
    pub fn groups(&self) -> impl Iterator<Item = usize> + '_ {
        self.init_groups
            .iter()
            .chain(self.continuation_groups.iter())
            .copied()
    }

    /// Apply `f` to every group index in both sets.
    pub(crate) fn remap_groups(&mut self, f: impl Fn(usize) -> usize) {
        self.init_groups = self.init_groups.iter().map(|&g| f(g)).collect();
        self.continuation_groups = self.continuation_groups.iter().map(|&g| f(g)).collect();
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} : ", self.from, self.to)?;
        match &self.guard {
            Guard::Matcher { primary, secondary } => {
                write!(f, "{primary}")?;
                for m in secondary {
                    write!(f, ":{m}")?;
                }
            }
            Guard::BackReference { group, secondary } => {
                write!(f, "\\{group}")?;
                for m in secondary {
                    write!(f, ":{m}")?;
                }
            }
            Guard::Epsilon => f.write_str("ε")?,
        }
        match self.kind {
            TransitionKind::Greedy => {}
            TransitionKind::Lazy => f.write_str(" (lazy)")?,
            TransitionKind::Possessive => f.write_str(" (possessive)")?,
        }
        match self.offset {
            MatchOffset::Match => {}
            MatchOffset::LookBehind => f.write_str(" (lookbehind)")?,
            MatchOffset::LookAhead => f.write_str(" (lookahead)")?,
        }
        if !self.init_groups.is_empty() {
            write!(f, " init{:?}", self.init_groups)?;
        }
        if !self.continuation_groups.is_empty() {
            write!(f, " cont{:?}", self.continuation_groups)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Guard {
        Guard::Matcher {
            primary: PhoneMatcher::literal(s),
            secondary: Vec::new(),
        }
    }

    #[test]
    fn matcher_guard_ands_secondary_matchers() {
        let guard = Guard::Matcher {
            primary: PhoneMatcher::Any,
            secondary: vec![PhoneMatcher::literal("a").negate()],
        };
        assert!(guard.matches_element(&PhoneticElement::phone("b")));
        assert!(!guard.matches_element(&PhoneticElement::phone("a")));
    }

    #[test]
    fn non_matcher_guards_never_match_single_elements() {
        let e = PhoneticElement::phone("a");
        assert!(!Guard::Epsilon.matches_element(&e));
        let br = Guard::BackReference {
            group: 1,
            secondary: Vec::new(),
        };
        assert!(!br.matches_element(&e));
    }

    #[test]
    fn rewired_keeps_payload_and_groups() {
        let mut t = Transition::new(StateId(0), StateId(1), lit("a"));
        t.init_groups.insert(2);
        t.kind = TransitionKind::Lazy;
        let r = t.rewired(StateId(5), StateId(6));
        assert_eq!((r.from, r.to), (StateId(5), StateId(6)));
        assert_eq!(r.kind, TransitionKind::Lazy);
        assert!(r.init_groups.contains(&2));
    }

    #[test]
    fn remap_groups_shifts_both_sets() {
        let mut t = Transition::new(StateId(0), StateId(1), lit("a"));
        t.init_groups.insert(1);
        t.continuation_groups.extend([1, 2]);
        t.remap_groups(|g| g + 1);
        assert_eq!(t.init_groups.iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(t.continuation_groups.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(t.groups().max(), Some(3));
    }

    #[test]
    fn display() {
        let mut t = Transition::new(StateId(0), StateId(1), lit("a"));
        t.init_groups.insert(1);
        assert_eq!(t.to_string(), "q0 -> q1 : 'a' init{1}");
        let e = Transition::new(StateId(1), StateId(2), Guard::Epsilon);
        assert_eq!(e.to_string(), "q1 -> q2 : ε");
        let mut ahead = Transition::new(StateId(2), StateId(3), lit("b"));
        ahead.offset = MatchOffset::LookAhead;
        assert_eq!(ahead.to_string(), "q2 -> q3 : 'b' (lookahead)");
    }
}
