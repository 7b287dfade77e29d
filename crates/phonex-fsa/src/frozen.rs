// Read-only automaton with a precomputed per-state search order.
// Origin: SimpleFSADebugContext.java (transition choice order)

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::automaton::PhonexFsa;
use crate::transition::{MatchOffset, StateId, Transition, TransitionKind};

/// One alternative the search tries at a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Choice {
    /// Report a match ending here.
    Accept,
    /// Take the transition with this index.
    Take(usize),
}

/// A validated automaton ready for matching.
///
/// Produced by [`PhonexFsa::freeze`]. It never changes afterwards and can be
/// shared between threads; each match run keeps its own search state.
#[derive(Debug, Clone)]
pub struct FrozenFsa {
    fsa: PhonexFsa,
    /// Choice order per state, indexed by state id.
    plan: Vec<Vec<Choice>>,
    /// Commit points, indexed by state id.
    commits: Vec<bool>,
    has_lookbehind: bool,
    group_names: Arc<[Option<String>]>,
}

impl FrozenFsa {
    pub(crate) fn new(fsa: PhonexFsa) -> Self {
        let mut plan = vec![Vec::new(); fsa.state_count()];
        let mut commits = vec![false; fsa.state_count()];
        for state in fsa.states() {
            plan[state.index()] = Self::plan_state(&fsa, state);
            commits[state.index()] = fsa.is_commit_point(state);
        }
        let has_lookbehind = fsa
            .transitions()
            .iter()
            .any(|t| t.offset == MatchOffset::LookBehind);
        let group_names: Arc<[Option<String>]> = fsa.group_name_table().into();
        debug!(
            "froze automaton: {} states, {} transitions, {} groups",
            fsa.state_count(),
            fsa.transitions().len(),
            fsa.group_count()
        );
        Self {
            fsa,
            plan,
            commits,
            has_lookbehind,
            group_names,
        }
    }

    /// Greedy and possessive moves, then accepting (for final states), then
    /// lazy moves. Each bucket keeps insertion order, epsilon moves included.
    fn plan_state(fsa: &PhonexFsa, state: StateId) -> Vec<Choice> {
        let outgoing: Vec<(usize, &Transition)> = fsa
            .transitions()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.from == state)
            .collect();

        let (lazy, eager): (Vec<_>, Vec<_>) = outgoing
            .iter()
            .partition(|(_, t)| t.kind == TransitionKind::Lazy);

        let mut choices: Vec<Choice> = Vec::with_capacity(outgoing.len() + 1);
        choices.extend(eager.iter().map(|&&(idx, _)| Choice::Take(idx)));
        if fsa.is_final(state) {
            choices.push(Choice::Accept);
        }
        choices.extend(lazy.iter().map(|&&(idx, _)| Choice::Take(idx)));
        choices
    }

    /// The underlying automaton.
    pub fn fsa(&self) -> &PhonexFsa {
        &self.fsa
    }

    pub fn initial_state(&self) -> StateId {
        self.fsa.initial_state()
    }

    pub fn transitions(&self) -> &[Transition] {
        self.fsa.transitions()
    }

    pub fn group_count(&self) -> usize {
        self.fsa.group_count()
    }

    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.fsa.group_index(name)
    }

    pub fn group_name(&self, group: usize) -> Option<&str> {
        self.fsa.group_name(group)
    }

    pub(crate) fn group_name_table(&self) -> &Arc<[Option<String>]> {
        &self.group_names
    }

    #[inline]
    pub(crate) fn choices(&self, state: StateId) -> &[Choice] {
        &self.plan[state.index()]
    }

    #[inline]
    pub(crate) fn is_commit_point(&self, state: StateId) -> bool {
        self.commits[state.index()]
    }

    /// Returns `true` if some transition consumes lookbehind context.
    pub fn has_lookbehind(&self) -> bool {
        self.has_lookbehind
    }
}

impl fmt::Display for FrozenFsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fsa, f)
    }
}
