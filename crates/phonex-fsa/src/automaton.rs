// Phonex automaton: state arena, transitions, and the construction API a
// pattern compiler drives.
// Origin: PhonexFSA.java (appendMatcher, appendBackReference, appendGroup, appendOredGroups)
// Origin: PhonexFSA.java:666-891 (applyQuantifier, makeBounded, group renumbering)

use std::collections::BTreeSet;
use std::fmt;

use hashbrown::{HashMap, HashSet};
use log::trace;

use crate::FsaError;
use crate::frozen::FrozenFsa;
use crate::matcher::PhoneMatcher;
use crate::quantifier::{Quantifier, QuantifierType};
use crate::transition::{Guard, MatchOffset, StateId, Transition, TransitionKind};

/// A phonex finite state automaton under construction.
///
/// States live in an arena owned by the automaton and are addressed by
/// [`StateId`]; transitions are plain records referring to those ids, so
/// splicing one automaton into another is an id-remapping copy.
///
/// The construction methods follow a "current final states" discipline:
/// appending an element strips the current finals, creates a new final
/// state, and wires the element from every old final (or from the initial
/// state when there are none yet). Once built, [`freeze`](Self::freeze)
/// validates the automaton and produces the read-only [`FrozenFsa`] the
/// execution engine runs.
#[derive(Debug, Clone)]
pub struct PhonexFsa {
    state_count: u32,
    initial: StateId,
    finals: BTreeSet<StateId>,
    transitions: Vec<Transition>,
    /// States where an iteration of a possessive quantifier is complete.
    commit_points: BTreeSet<StateId>,
    group_count: usize,
    /// `group_names[g - 1]` is the name of group `g`.
    group_names: Vec<Option<String>>,
}

impl Default for PhonexFsa {
    fn default() -> Self {
        Self::new()
    }
}

impl PhonexFsa {
    /// Create an automaton with a single, non-final initial state.
    pub fn new() -> Self {
        let mut fsa = Self {
            state_count: 0,
            initial: StateId(0),
            finals: BTreeSet::new(),
            transitions: Vec::new(),
            commit_points: BTreeSet::new(),
            group_count: 0,
            group_names: Vec::new(),
        };
        fsa.initial = fsa.append_state();
        fsa
    }

    // -----------------------------------------------------------------------
    // States and transitions
    // -----------------------------------------------------------------------

    /// Add a new state with no incident transitions.
    pub fn append_state(&mut self) -> StateId {
        let id = StateId(self.state_count);
        self.state_count += 1;
        id
    }

    pub fn initial_state(&self) -> StateId {
        self.initial
    }

    pub fn state_count(&self) -> usize {
        self.state_count as usize
    }

    /// All states in creation order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + use<> {
        (0..self.state_count).map(StateId)
    }

    /// The current final states, in ascending id order.
    pub fn final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.finals.iter().copied()
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    pub fn add_final_state(&mut self, state: StateId) {
        self.check_state(state);
        self.finals.insert(state);
    }

    pub fn remove_final_state(&mut self, state: StateId) {
        self.finals.remove(&state);
    }

    /// Make every current final state non-final and return them.
    pub fn strip_final_states(&mut self) -> Vec<StateId> {
        std::mem::take(&mut self.finals).into_iter().collect()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transitions leaving `state`, in insertion order.
    pub fn transitions_from(&self, state: StateId) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions.iter().filter(move |t| t.from == state)
    }

    /// Transitions entering `state`, in insertion order.
    pub fn transitions_to(&self, state: StateId) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions.iter().filter(move |t| t.to == state)
    }

    /// Add a transition. Both endpoints must belong to this automaton.
    pub fn add_transition(&mut self, transition: Transition) {
        self.check_state(transition.from);
        self.check_state(transition.to);
        self.transitions.push(transition);
    }

    fn check_state(&self, state: StateId) {
        assert!(
            state.0 < self.state_count,
            "state {state} is not owned by this automaton ({} states)",
            self.state_count
        );
    }

    /// Old finals to wire new transitions from: the stripped final states,
    /// or the initial state when there were none.
    fn strip_anchors(&mut self) -> Vec<StateId> {
        let anchors = self.strip_final_states();
        if anchors.is_empty() {
            vec![self.initial]
        } else {
            anchors
        }
    }

    // -----------------------------------------------------------------------
    // Appending matchers and backreferences
    // -----------------------------------------------------------------------

    /// Concatenate one matcher (ANDed with `secondary`) onto the automaton.
    pub fn append_matcher(&mut self, matcher: PhoneMatcher, secondary: &[PhoneMatcher]) {
        self.append_guard(Guard::Matcher {
            primary: matcher,
            secondary: secondary.to_vec(),
        });
    }

    /// Concatenate a backreference to `group` onto the automaton.
    pub fn append_backreference(&mut self, group: usize, secondary: &[PhoneMatcher]) {
        self.append_guard(Guard::BackReference {
            group,
            secondary: secondary.to_vec(),
        });
    }

    /// Concatenate a quantified matcher.
    pub fn append_matcher_with_quantifier(
        &mut self,
        matcher: PhoneMatcher,
        quantifier: Quantifier,
        secondary: &[PhoneMatcher],
    ) {
        self.append_quantified(
            Guard::Matcher {
                primary: matcher,
                secondary: secondary.to_vec(),
            },
            quantifier,
        );
    }

    /// Concatenate a quantified backreference.
    pub fn append_backreference_with_quantifier(
        &mut self,
        group: usize,
        quantifier: Quantifier,
        secondary: &[PhoneMatcher],
    ) {
        self.append_quantified(
            Guard::BackReference {
                group,
                secondary: secondary.to_vec(),
            },
            quantifier,
        );
    }

    fn append_guard(&mut self, guard: Guard) {
        let anchors = self.strip_anchors();
        let target = self.append_state();
        self.finals.insert(target);
        for &anchor in &anchors {
            self.transitions
                .push(Transition::new(anchor, target, guard.clone()));
        }
        trace!("appended {} transition(s) into {target}", anchors.len());
    }

    fn append_quantified(&mut self, guard: Guard, quantifier: Quantifier) {
        if let QuantifierType::Bounded { max: Some(0), .. } = quantifier.qtype() {
            return;
        }
        match quantifier.qtype() {
            QuantifierType::ZeroOrMore => self.append_zero_or_more(guard),
            QuantifierType::ZeroOrOne => self.append_zero_or_one(guard),
            QuantifierType::OneOrMore => self.append_one_or_more(guard),
            QuantifierType::Bounded { min, max } => self.append_bounded(guard, min, max),
        }
        self.apply_kind(quantifier.transition_kind());
    }

    fn append_zero_or_more(&mut self, guard: Guard) {
        self.append_guard(guard.clone());
        let finals: Vec<StateId> = self.final_states().collect();
        for final_state in finals {
            self.promote_sources_of(final_state);
            self.transitions
                .push(Transition::new(final_state, final_state, guard.clone()));
        }
    }

    fn append_zero_or_one(&mut self, guard: Guard) {
        self.append_guard(guard);
        let finals: Vec<StateId> = self.final_states().collect();
        for final_state in finals {
            self.promote_sources_of(final_state);
        }
    }

    fn append_one_or_more(&mut self, guard: Guard) {
        self.append_guard(guard.clone());
        let finals: Vec<StateId> = self.final_states().collect();
        for final_state in finals {
            self.transitions
                .push(Transition::new(final_state, final_state, guard.clone()));
        }
    }

    /// `<min,max>` as repeated copies: `min` mandatory, then `max - min`
    /// optional. Open-ended bounds make the last mandatory copy one-or-more;
    /// `<0,>` is zero-or-more.
    fn append_bounded(&mut self, guard: Guard, min: usize, max: Option<usize>) {
        match max {
            None if min == 0 => self.append_zero_or_more(guard),
            None => {
                for _ in 1..min {
                    self.append_guard(guard.clone());
                }
                self.append_one_or_more(guard);
            }
            Some(max) => {
                for _ in 0..min {
                    self.append_guard(guard.clone());
                }
                for _ in min..max {
                    self.append_zero_or_one(guard.clone());
                }
            }
        }
    }

    /// Make the source of every transition entering `state` final.
    fn promote_sources_of(&mut self, state: StateId) {
        let sources: Vec<StateId> = self.transitions_to(state).map(|t| t.from).collect();
        self.finals.extend(sources);
    }

    /// Overwrite the kind of every transition leaving a final state.
    ///
    /// A possessive kind also turns the current finals into commit points:
    /// once the search passes one of them after a possessive step, it never
    /// backtracks into that step again.
    fn apply_kind(&mut self, kind: TransitionKind) {
        let finals = &self.finals;
        for t in self.transitions.iter_mut().filter(|t| finals.contains(&t.from)) {
            t.kind = kind;
        }
        if kind == TransitionKind::Possessive {
            self.commit_points.extend(finals.iter().copied());
        }
    }

    /// States recorded as commit points by possessive quantifiers.
    pub fn commit_points(&self) -> impl Iterator<Item = StateId> + '_ {
        self.commit_points.iter().copied()
    }

    pub fn is_commit_point(&self, state: StateId) -> bool {
        self.commit_points.contains(&state)
    }

    // -----------------------------------------------------------------------
    // Groups and alternation
    // -----------------------------------------------------------------------

    /// Splice a finished sub-automaton onto the current final states.
    ///
    /// The sub-automaton's initial state is identified with each current
    /// final state (or with this automaton's initial state when there are no
    /// finals yet). If the sub-automaton accepts the empty sequence, the
    /// current finals stay final.
    pub fn append_group(&mut self, group: &PhonexFsa) {
        let accepts_empty = group.is_final(group.initial);
        let anchors = if accepts_empty {
            let current: Vec<StateId> = self.final_states().collect();
            if current.is_empty() {
                vec![self.initial]
            } else {
                current
            }
        } else {
            self.strip_anchors()
        };
        if accepts_empty {
            self.finals.extend(anchors.iter().copied());
        }

        let reenters_initial = group.transitions_to(group.initial).next().is_some();
        let mut state_map = self.copy_states(group, reenters_initial);

        if reenters_initial {
            // Some transition loops back to the group's initial state, so it
            // needs its own copy; anchors reach it through epsilon moves.
            let entry = state_map[&group.initial];
            for &anchor in &anchors {
                self.transitions
                    .push(Transition::new(anchor, entry, Guard::Epsilon));
            }
            self.copy_transitions(group, &state_map, |_| true);
        } else {
            for &anchor in &anchors {
                state_map.insert(group.initial, anchor);
                self.copy_transitions(group, &state_map, |t| t.from == group.initial);
            }
            self.copy_transitions(group, &state_map, |t| t.from != group.initial);
            if group.is_commit_point(group.initial) {
                self.commit_points.extend(anchors.iter().copied());
            }
        }

        self.merge_group_names(group);
        trace!(
            "spliced group of {} states onto {} anchor(s)",
            group.state_count,
            anchors.len()
        );
    }

    /// Append a lookbehind context. The search consumes `context` at the
    /// start of an attempt, but those elements are left out of the reported
    /// match. Append it before any other element.
    pub fn append_lookbehind(&mut self, context: &PhonexFsa) {
        self.append_context(context, MatchOffset::LookBehind);
    }

    /// Append a lookahead context: `context` must follow the match, and the
    /// elements it consumes are left out of the reported match. Append it
    /// after every other element.
    pub fn append_lookahead(&mut self, context: &PhonexFsa) {
        self.append_context(context, MatchOffset::LookAhead);
    }

    fn append_context(&mut self, context: &PhonexFsa, offset: MatchOffset) {
        let mut context = context.clone();
        for t in &mut context.transitions {
            t.offset = offset;
        }
        self.append_group(&context);
    }

    /// Append alternatives: every branch hangs off a fresh entry state that
    /// is reached by an epsilon transition from each current final state.
    pub fn append_alternation(&mut self, branches: &[PhonexFsa]) {
        let anchors = self.strip_anchors();
        for branch in branches {
            let state_map = self.copy_states(branch, true);
            let entry = state_map[&branch.initial];
            for &anchor in &anchors {
                self.transitions
                    .push(Transition::new(anchor, entry, Guard::Epsilon));
            }
            self.copy_transitions(branch, &state_map, |_| true);
            self.merge_group_names(branch);
        }
        trace!("appended alternation of {} branch(es)", branches.len());
    }

    /// Allocate a fresh state for every state of `other` (skipping its
    /// initial state unless `include_initial`), preserving finality and
    /// commit points.
    fn copy_states(
        &mut self,
        other: &PhonexFsa,
        include_initial: bool,
    ) -> HashMap<StateId, StateId> {
        let mut state_map = HashMap::with_capacity(other.state_count());
        for state in other.states() {
            if state == other.initial && !include_initial {
                continue;
            }
            let fresh = self.append_state();
            if other.is_final(state) {
                self.finals.insert(fresh);
            }
            if other.is_commit_point(state) {
                self.commit_points.insert(fresh);
            }
            state_map.insert(state, fresh);
        }
        state_map
    }

    fn copy_transitions(
        &mut self,
        other: &PhonexFsa,
        state_map: &HashMap<StateId, StateId>,
        filter: impl Fn(&Transition) -> bool,
    ) {
        for t in other.transitions.iter().filter(|t| filter(t)) {
            let copy = t.rewired(state_map[&t.from], state_map[&t.to]);
            self.transitions.push(copy);
        }
    }

    fn merge_group_names(&mut self, other: &PhonexFsa) {
        if other.group_count > self.group_count {
            self.set_group_count(other.group_count);
        }
        for (idx, name) in other.group_names.iter().enumerate() {
            if self.group_names[idx].is_none() {
                self.group_names[idx] = name.clone();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Whole-automaton quantifiers
    // -----------------------------------------------------------------------

    /// Quantify the entire automaton, as for `(ab)+`.
    pub fn apply_quantifier(&mut self, quantifier: Quantifier) {
        match quantifier.qtype() {
            QuantifierType::ZeroOrMore => self.make_zero_or_more(),
            QuantifierType::ZeroOrOne => self.make_zero_or_one(),
            QuantifierType::OneOrMore => self.make_one_or_more(),
            QuantifierType::Bounded { min, max } => self.make_bounded(min, max),
        }
        self.apply_kind(quantifier.transition_kind());
    }

    fn make_zero_or_more(&mut self) {
        self.make_one_or_more();
        self.finals.insert(self.initial);
    }

    /// Copy the initial state's outgoing transitions onto every final state.
    fn make_one_or_more(&mut self) {
        let initial = self.initial;
        let entries: Vec<Transition> = self.transitions_from(initial).cloned().collect();
        let finals: Vec<StateId> = self.final_states().filter(|&s| s != initial).collect();
        for final_state in finals {
            for t in &entries {
                self.transitions.push(t.rewired(final_state, t.to));
            }
        }
    }

    fn make_zero_or_one(&mut self) {
        self.finals.insert(self.initial);
    }

    fn make_bounded(&mut self, min: usize, max: Option<usize>) {
        let unit = self.clone();
        match max {
            None if min == 0 => self.make_zero_or_more(),
            None => {
                if min == 1 {
                    self.make_one_or_more();
                } else {
                    for _ in 2..min {
                        self.append_group(&unit);
                    }
                    let mut last = unit.clone();
                    last.make_one_or_more();
                    self.append_group(&last);
                }
            }
            Some(0) => {
                self.strip_final_states();
                self.finals.insert(self.initial);
            }
            Some(max) => {
                let mut optional = unit.clone();
                optional.make_zero_or_one();
                if min == 0 {
                    self.make_zero_or_one();
                } else {
                    for _ in 1..min {
                        self.append_group(&unit);
                    }
                }
                for _ in min.max(1)..max {
                    self.append_group(&optional);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Group numbering
    // -----------------------------------------------------------------------

    /// Mark this automaton as capture group `group`: transitions leaving the
    /// initial state start the group, every other transition extends it.
    ///
    /// If the automaton accepts the empty sequence it first gets a fresh,
    /// non-final initial state joined to the old one by an epsilon move.
    /// That move opens the group, so matching the group empty still records
    /// an empty span.
    pub fn set_group_index(&mut self, group: usize) {
        if self.is_final(self.initial) {
            let entry = self.append_state();
            let old = std::mem::replace(&mut self.initial, entry);
            self.transitions
                .push(Transition::new(entry, old, Guard::Epsilon));
        }
        let initial = self.initial;
        for t in &mut self.transitions {
            if t.from == initial {
                t.init_groups.insert(group);
            } else {
                t.continuation_groups.insert(group);
            }
        }
    }

    /// Renumber every group index relative to an enclosing group: each index
    /// `g` becomes `g + parent_group`, so a sub-pattern numbered from 1 can
    /// follow `parent_group` groups that are already numbered.
    pub fn set_parent_group_index(&mut self, parent_group: usize) {
        for t in &mut self.transitions {
            t.remap_groups(|g| g + parent_group);
        }
    }

    pub fn increment_groups(&mut self) {
        self.set_parent_group_index(1);
    }

    /// Shift every group index down by one.
    ///
    /// # Panics
    ///
    /// Panics if any transition references group 1, which has no lower index.
    pub fn decrement_groups(&mut self) {
        for t in &mut self.transitions {
            t.remap_groups(|g| {
                assert!(g > 1, "cannot decrement group index {g}");
                g - 1
            });
        }
    }

    /// Remove every group index from every transition.
    pub fn strip_groups(&mut self) {
        for t in &mut self.transitions {
            t.init_groups.clear();
            t.continuation_groups.clear();
        }
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Set the number of capture groups (group 0, the whole match, is not
    /// counted).
    pub fn set_group_count(&mut self, count: usize) {
        self.group_count = count;
        self.group_names.resize(count, None);
    }

    /// Name group `group` (1-based).
    pub fn set_group_name(
        &mut self,
        group: usize,
        name: impl Into<String>,
    ) -> Result<(), FsaError> {
        if group == 0 || group > self.group_count {
            return Err(FsaError::GroupIndexOutOfRange {
                index: group,
                group_count: self.group_count,
            });
        }
        self.group_names[group - 1] = Some(name.into());
        Ok(())
    }

    /// Name of group `group`, if it has one.
    pub fn group_name(&self, group: usize) -> Option<&str> {
        group
            .checked_sub(1)
            .and_then(|idx| self.group_names.get(idx))
            .and_then(|name| name.as_deref())
    }

    /// Index of the group called `name`.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.group_names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(|idx| idx + 1)
    }

    /// Names of all named groups, in group order.
    pub fn group_names(&self) -> Vec<&str> {
        self.group_names.iter().filter_map(|n| n.as_deref()).collect()
    }

    pub(crate) fn group_name_table(&self) -> &[Option<String>] {
        &self.group_names
    }

    // -----------------------------------------------------------------------
    // Freezing
    // -----------------------------------------------------------------------

    /// Check group references against the group count.
    pub fn validate(&self) -> Result<(), FsaError> {
        let out_of_range = |index: usize| index == 0 || index > self.group_count;
        for t in &self.transitions {
            let backref = match &t.guard {
                Guard::BackReference { group, .. } => Some(*group),
                _ => None,
            };
            if let Some(index) = t.groups().chain(backref).find(|&g| out_of_range(g)) {
                return Err(FsaError::GroupIndexOutOfRange {
                    index,
                    group_count: self.group_count,
                });
            }
        }

        let mut seen = HashSet::new();
        for name in self.group_names() {
            if !seen.insert(name) {
                return Err(FsaError::DuplicateGroupName(name.to_string()));
            }
        }
        Ok(())
    }

    /// Finish construction: validate and produce the read-only automaton
    /// used for matching.
    pub fn freeze(self) -> Result<FrozenFsa, FsaError> {
        self.validate()?;
        Ok(FrozenFsa::new(self))
    }
}

impl fmt::Display for PhonexFsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initial: {}", self.initial)?;
        let finals: Vec<String> = self.final_states().map(|s| s.to_string()).collect();
        writeln!(f, "finals: {}", finals.join(", "))?;
        if !self.commit_points.is_empty() {
            let commits: Vec<String> = self.commit_points().map(|s| s.to_string()).collect();
            writeln!(f, "commits: {}", commits.join(", "))?;
        }
        for t in &self.transitions {
            writeln!(f, "{t}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> PhoneMatcher {
        PhoneMatcher::literal(s)
    }

    fn edges(fsa: &PhonexFsa) -> Vec<(u32, u32)> {
        fsa.transitions().iter().map(|t| (t.from.0, t.to.0)).collect()
    }

    fn finals(fsa: &PhonexFsa) -> Vec<u32> {
        fsa.final_states().map(|s| s.0).collect()
    }

    #[test]
    fn new_automaton_has_non_final_initial_state() {
        let fsa = PhonexFsa::new();
        assert_eq!(fsa.state_count(), 1);
        assert_eq!(fsa.initial_state(), StateId(0));
        assert!(finals(&fsa).is_empty());
    }

    #[test]
    fn append_matcher_chains_from_finals() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("a"), &[]);
        fsa.append_matcher(lit("b"), &[]);
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2)]);
        assert_eq!(finals(&fsa), vec![2]);
    }

    #[test]
    fn append_backreference_uses_same_wiring() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("a"), &[]);
        fsa.append_backreference(1, &[]);
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2)]);
        assert!(matches!(
            fsa.transitions()[1].guard,
            Guard::BackReference { group: 1, .. }
        ));
    }

    #[test]
    fn zero_or_more_promotes_and_loops() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("b"), &[]);
        fsa.append_matcher_with_quantifier(lit("a"), Quantifier::zero_or_more(), &[]);
        // b: 0->1, a: 1->2, loop 2->2
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2), (2, 2)]);
        assert_eq!(finals(&fsa), vec![1, 2]);
    }

    #[test]
    fn zero_or_one_promotes_without_loop() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher_with_quantifier(lit("a"), Quantifier::zero_or_one(), &[]);
        assert_eq!(edges(&fsa), vec![(0, 1)]);
        assert_eq!(finals(&fsa), vec![0, 1]);
    }

    #[test]
    fn one_or_more_loops_without_promotion() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher_with_quantifier(lit("a"), Quantifier::one_or_more(), &[]);
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 1)]);
        assert_eq!(finals(&fsa), vec![1]);
    }

    #[test]
    fn bounded_expands_into_copies() {
        let mut fsa = PhonexFsa::new();
        let q = Quantifier::bounded(1, Some(3)).unwrap();
        fsa.append_matcher_with_quantifier(lit("a"), q, &[]);
        // mandatory 0->1, optional copies 1->2, then {1,2}->3
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(finals(&fsa), vec![1, 2, 3]);
    }

    #[test]
    fn open_bounded_ends_in_one_or_more() {
        let mut fsa = PhonexFsa::new();
        let q = Quantifier::bounded(2, None).unwrap();
        fsa.append_matcher_with_quantifier(lit("a"), q, &[]);
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2), (2, 2)]);
        assert_eq!(finals(&fsa), vec![2]);
    }

    #[test]
    fn quantifier_kind_overwrites_transitions_leaving_finals() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("x"), &[]);
        fsa.append_matcher_with_quantifier(lit("a"), Quantifier::zero_or_more().lazy(), &[]);
        let kinds: Vec<TransitionKind> = fsa.transitions().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TransitionKind::Greedy, TransitionKind::Lazy, TransitionKind::Lazy]
        );
    }

    #[test]
    fn append_group_splices_sub_automaton() {
        let mut group = PhonexFsa::new();
        group.append_matcher(lit("a"), &[]);
        group.append_matcher(lit("b"), &[]);
        group.set_group_index(1);

        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("x"), &[]);
        fsa.append_group(&group);

        // x: 0->1; group states 1,2 copied as 2,3; a: 1->2, b: 2->3
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(finals(&fsa), vec![3]);
        assert!(fsa.transitions()[1].init_groups.contains(&1));
        assert!(fsa.transitions()[2].continuation_groups.contains(&1));
    }

    #[test]
    fn append_group_keeps_finals_when_group_accepts_empty() {
        let mut group = PhonexFsa::new();
        group.append_matcher(lit("a"), &[]);
        group.apply_quantifier(Quantifier::zero_or_one());

        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("x"), &[]);
        fsa.append_group(&group);
        assert_eq!(finals(&fsa), vec![1, 2]);
    }

    #[test]
    fn append_group_with_loop_to_initial_uses_epsilon_entry() {
        let mut group = PhonexFsa::new();
        let s1 = group.append_state();
        group.add_transition(Transition::new(group.initial_state(), s1, Guard::Epsilon));
        group.add_transition(Transition::new(
            s1,
            group.initial_state(),
            Guard::Matcher {
                primary: lit("a"),
                secondary: Vec::new(),
            },
        ));
        group.add_final_state(s1);

        let mut fsa = PhonexFsa::new();
        fsa.append_group(&group);
        // entry copy of group initial is q1, s1 is q2
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2), (2, 1)]);
        assert!(fsa.transitions()[0].guard.is_epsilon());
        assert_eq!(finals(&fsa), vec![2]);
    }

    #[test]
    fn alternation_wires_epsilons_to_branch_entries() {
        let mut a = PhonexFsa::new();
        a.append_matcher(lit("a"), &[]);
        let mut b = PhonexFsa::new();
        b.append_matcher(lit("b"), &[]);

        let mut fsa = PhonexFsa::new();
        fsa.append_alternation(&[a, b]);
        // eps 0->1, a 1->2, eps 0->3, b 3->4
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2), (0, 3), (3, 4)]);
        assert!(fsa.transitions()[0].guard.is_epsilon());
        assert_eq!(finals(&fsa), vec![2, 4]);
    }

    #[test]
    fn set_group_index_splits_init_and_continuation() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("a"), &[]);
        fsa.append_matcher(lit("b"), &[]);
        fsa.set_group_index(2);
        let t = fsa.transitions();
        assert!(t[0].init_groups.contains(&2) && t[0].continuation_groups.is_empty());
        assert!(t[1].continuation_groups.contains(&2) && t[1].init_groups.is_empty());
    }

    #[test]
    fn set_group_index_on_empty_accepting_automaton_adds_entry() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher_with_quantifier(lit("a"), Quantifier::zero_or_more(), &[]);
        fsa.set_group_index(1);
        // a: 0->1, loop 1->1, then entry q2 -> q0
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 1), (2, 0)]);
        assert_eq!(fsa.initial_state(), StateId(2));
        assert_eq!(finals(&fsa), vec![0, 1]);
        let t = fsa.transitions();
        assert!(t[2].guard.is_epsilon() && t[2].init_groups.contains(&1));
        assert!(t[0].init_groups.is_empty() && t[0].continuation_groups.contains(&1));

        // the group no longer accepts at its initial state, so splicing it
        // strips the anchors and enters through the epsilon
        let mut outer = PhonexFsa::new();
        outer.append_matcher(lit("x"), &[]);
        outer.append_group(&fsa);
        assert!(!outer.is_final(StateId(1)));
        assert!(outer.transitions_from(StateId(1)).all(|t| t.guard.is_epsilon()));
    }

    #[test]
    fn possessive_quantifiers_record_commit_points() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("x"), &[]);
        fsa.append_matcher_with_quantifier(lit("a"), Quantifier::zero_or_more().possessive(), &[]);
        assert_eq!(fsa.commit_points().map(|s| s.0).collect::<Vec<_>>(), vec![1, 2]);

        let mut greedy = PhonexFsa::new();
        greedy.append_matcher_with_quantifier(lit("a"), Quantifier::zero_or_more(), &[]);
        assert_eq!(greedy.commit_points().count(), 0);

        let mut unit = PhonexFsa::new();
        unit.append_matcher(lit("a"), &[]);
        unit.append_matcher(lit("b"), &[]);
        unit.apply_quantifier(Quantifier::one_or_more().possessive());
        let mut outer = PhonexFsa::new();
        outer.append_matcher(lit("x"), &[]);
        outer.append_group(&unit);
        // unit state 2 is copied as q3
        assert_eq!(outer.commit_points().map(|s| s.0).collect::<Vec<_>>(), vec![3]);
        assert!(outer.to_string().contains("commits: q3\n"));
    }

    #[test]
    fn context_transitions_carry_their_offset() {
        let mut context = PhonexFsa::new();
        context.append_matcher(lit("s"), &[]);

        let mut fsa = PhonexFsa::new();
        fsa.append_lookbehind(&context);
        fsa.append_matcher(lit("a"), &[]);
        fsa.append_lookahead(&context);
        let offsets: Vec<MatchOffset> = fsa.transitions().iter().map(|t| t.offset).collect();
        assert_eq!(
            offsets,
            vec![MatchOffset::LookBehind, MatchOffset::Match, MatchOffset::LookAhead]
        );
        assert_eq!(edges(&fsa), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn renumbering_groups() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("a"), &[]);
        fsa.set_group_index(1);
        fsa.increment_groups();
        assert!(fsa.transitions()[0].init_groups.contains(&2));
        fsa.set_parent_group_index(3);
        assert!(fsa.transitions()[0].init_groups.contains(&5));
        fsa.decrement_groups();
        assert!(fsa.transitions()[0].init_groups.contains(&4));
        fsa.strip_groups();
        assert!(fsa.transitions()[0].init_groups.is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot decrement group index 1")]
    fn decrementing_group_one_panics() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("a"), &[]);
        fsa.set_group_index(1);
        fsa.decrement_groups();
    }

    #[test]
    #[should_panic(expected = "not owned by this automaton")]
    fn foreign_state_is_rejected() {
        let mut other = PhonexFsa::new();
        other.append_state();
        let foreign = other.append_state();
        let mut fsa = PhonexFsa::new();
        fsa.add_final_state(foreign);
    }

    #[test]
    fn whole_automaton_quantifiers() {
        let mut plus = PhonexFsa::new();
        plus.append_matcher(lit("a"), &[]);
        plus.append_matcher(lit("b"), &[]);
        plus.apply_quantifier(Quantifier::one_or_more());
        // copy of 0->1 from final 2
        assert_eq!(edges(&plus), vec![(0, 1), (1, 2), (2, 1)]);
        assert_eq!(finals(&plus), vec![2]);

        let mut star = PhonexFsa::new();
        star.append_matcher(lit("a"), &[]);
        star.apply_quantifier(Quantifier::zero_or_more());
        assert_eq!(edges(&star), vec![(0, 1), (1, 1)]);
        assert_eq!(finals(&star), vec![0, 1]);
    }

    #[test]
    fn group_names() {
        let mut fsa = PhonexFsa::new();
        fsa.set_group_count(3);
        fsa.set_group_name(1, "onset").unwrap();
        fsa.set_group_name(3, "coda").unwrap();
        assert_eq!(fsa.group_name(1), Some("onset"));
        assert_eq!(fsa.group_name(2), None);
        assert_eq!(fsa.group_name(0), None);
        assert_eq!(fsa.group_index("coda"), Some(3));
        assert_eq!(fsa.group_index("nucleus"), None);
        assert_eq!(fsa.group_names(), vec!["onset", "coda"]);
        assert!(matches!(
            fsa.set_group_name(4, "x"),
            Err(FsaError::GroupIndexOutOfRange { index: 4, group_count: 3 })
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_groups() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("a"), &[]);
        fsa.set_group_index(1);
        assert!(matches!(
            fsa.validate(),
            Err(FsaError::GroupIndexOutOfRange { index: 1, group_count: 0 })
        ));
        fsa.set_group_count(1);
        assert!(fsa.validate().is_ok());

        fsa.append_backreference(2, &[]);
        assert!(matches!(
            fsa.freeze(),
            Err(FsaError::GroupIndexOutOfRange { index: 2, group_count: 1 })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let mut fsa = PhonexFsa::new();
        fsa.set_group_count(2);
        fsa.set_group_name(1, "C").unwrap();
        fsa.set_group_name(2, "C").unwrap();
        assert!(matches!(
            fsa.validate(),
            Err(FsaError::DuplicateGroupName(name)) if name == "C"
        ));
    }

    #[test]
    fn display_lists_states_and_transitions() {
        let mut fsa = PhonexFsa::new();
        fsa.append_matcher(lit("a"), &[]);
        assert_eq!(fsa.to_string(), "initial: q0\nfinals: q1\nq0 -> q1 : 'a'\n");
    }
}
